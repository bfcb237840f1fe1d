//! nslice - Command-line nine-slice editor and compositor

use std::process::ExitCode;

use nineslice::cli;

fn main() -> ExitCode {
    cli::run()
}
