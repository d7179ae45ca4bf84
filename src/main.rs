mod command;
mod convert;
mod encoder;
mod ffmpeg;
mod ffprobe;
mod log;
mod process;
mod select;
mod temporary;
mod toolchain;
mod video;

use anyhow::anyhow;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use command::{Status, args::Tools};
use console::style;
use select::Selection;
use std::process::ExitCode;
use tokio::signal;

const EXIT_CODES: &str = "Exit codes:
  0  all selected files handled
  1  fatal error, e.g. encoder detection failed or interrupted
  2  invalid input, nothing done
  3  one or more files failed to convert";

/// Convert videos to H.264/AAC mp4 using the best available ffmpeg encoder.
///
/// Converted files are written to a "convertiti" folder next to each input,
/// the original is deleted once the output is verified.
#[derive(Parser)]
#[command(version, about, after_help = EXIT_CODES)]
pub struct Args {
    #[command(subcommand)]
    action: Option<Action>,

    #[command(flatten)]
    tools: Tools,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(clap::Subcommand)]
enum Action {
    /// Choose what to convert from a menu (default).
    Interactive,
    File(command::convert::FileArgs),
    Files(command::convert::FilesArgs),
    Dir(command::convert::DirArgs),
    /// Show the H.264 encoders ffmpeg lists & which one would be used.
    Encoders,
    PrintCompletions(command::print_completions::Args),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let Args {
        action,
        tools,
        verbose,
    } = Args::parse();

    env_logger::Builder::new()
        .filter_level(verbose.log_level_filter())
        .parse_default_env()
        .init();

    // input is gathered before handling ctrl_c so prompts remain interruptible
    let selection = match action.unwrap_or(Action::Interactive) {
        Action::Interactive => {
            match command::interactive::select(&mut std::io::stdin().lock(), &mut std::io::stdout())
            {
                Ok(Some(selection)) => selection,
                Ok(None) => {
                    eprintln!("{} choice", style("Invalid").red().bold());
                    return Status::InvalidInput.exit_code();
                }
                Err(err) => return fatal(err.into()),
            }
        }
        Action::File(args) => Selection::from(args),
        Action::Files(args) => Selection::from(args),
        Action::Dir(args) => Selection::from(args),
        Action::Encoders => {
            return match command::encoders(&tools).await {
                Ok(_) => ExitCode::SUCCESS,
                Err(err) => fatal(err),
            };
        }
        Action::PrintCompletions(args) => {
            command::print_completions(args);
            return ExitCode::SUCCESS;
        }
    };

    let out = tokio::select! {
        r = command::convert(selection, &tools) => r,
        _ = signal::ctrl_c() => Err(anyhow!("ctrl_c")),
    };

    // remove partial outputs, if interrupted
    temporary::clean().await;

    match out {
        Ok(status) => status.exit_code(),
        Err(err) => fatal(err),
    }
}

fn fatal(err: anyhow::Error) -> ExitCode {
    eprintln!("{} {err:#}", style("Error:").red().bold());
    ExitCode::from(command::EXIT_FATAL)
}
