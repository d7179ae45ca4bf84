pub mod args;
pub mod convert;
pub mod encoders;
pub mod interactive;
pub mod print_completions;

pub use convert::convert;
pub use encoders::encoders;
pub use print_completions::print_completions;

use std::process::ExitCode;

/// How a conversion run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every selected file was handled.
    Done,
    /// Nothing was done as the input was invalid.
    InvalidInput,
    /// At least one file failed to convert.
    Failures,
}

/// Exit code for fatal errors like failing to detect encoders.
pub const EXIT_FATAL: u8 = 1;

impl Status {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Done => ExitCode::SUCCESS,
            Self::InvalidInput => ExitCode::from(2),
            Self::Failures => ExitCode::from(3),
        }
    }
}
