use std::process::ExitCode;

use pagetree::validate::ValidateError;
use pagetree::{cli, logging, runner};

fn main() -> ExitCode {
    logging::init();
    let cli = cli::parse();
    match runner::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Precondition failures are part of the CLI contract: one line
            // on stdout, exit code 1. Anything else is a hard stop.
            if let Some(precondition) = err.downcast_ref::<ValidateError>() {
                println!("error: {precondition}");
            } else {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
