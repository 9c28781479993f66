//! mpipe - command-line entry point for meshpipe.

use std::process::ExitCode;

fn main() -> ExitCode {
    match meshpipe::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
