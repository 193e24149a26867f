//! skatepark CLI entry point
//!
//! Parsing, configuration and startup all live in the CLI module; this
//! only reports the failure and sets the exit code.

use skatepark::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
