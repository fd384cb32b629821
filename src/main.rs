//! txtdb CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. The error response
//! has already been written to stdout; the message is repeated on stderr
//! and the process exits non-zero.

use txtdb::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
