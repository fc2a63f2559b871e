use dfget_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    // Diagnostics emitted before the per-run log handles exist go to stderr.
    logging::init_logging_stderr();

    if let Err(err) = Cli::run_from_args() {
        eprintln!("dfget error: {:#}", err);
        std::process::exit(1);
    }
}
