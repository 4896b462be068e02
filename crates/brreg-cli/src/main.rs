#![forbid(unsafe_code)]

use std::process::ExitCode;

fn main() -> ExitCode {
    brreg_cli::run()
}
