//! Vigil CLI - replay permission-change events through the audit pipeline.
//!
//! Main entry point for the `vigil` binary.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

mod cli;
mod output;
mod replay;

use cli::Cli;

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.run() {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            Exit::GeneralError.into()
        }
    }
}
