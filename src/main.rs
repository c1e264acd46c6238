//! zipstore CLI entry point
//!
//! Dispatches through `cli::run`, which reports failures as a JSON error
//! response on stdout, then exits non-zero on failure. All other logic
//! lives in the library.

use zipstore::cli;

fn main() {
    if cli::run().is_err() {
        std::process::exit(1);
    }
}
