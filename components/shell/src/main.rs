//! Vermeil shell binary.
//!
//! Parses CLI arguments and hands control to the driver; the exit code
//! is nonzero iff any unit test failed (or bootstrap did).

use clap::Parser;
use shell::Cli;

fn main() {
    let cli = Cli::parse();
    std::process::exit(shell::run(&cli));
}
