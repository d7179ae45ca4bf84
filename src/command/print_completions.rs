use clap::{CommandFactory, Parser};
use clap_complete::Shell;

/// Print shell completions.
#[derive(Parser)]
pub struct Args {
    /// Shell.
    #[arg(value_enum, default_value_t = Shell::Bash)]
    shell: Shell,
}

pub fn print_completions(Args { shell }: Args) {
    clap_complete::generate(
        shell,
        &mut crate::Args::command(),
        env!("CARGO_PKG_NAME"),
        &mut std::io::stdout(),
    );
}
