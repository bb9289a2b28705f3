//! TFGrid client binary entrypoint.
//!
//! Prints the command result on stdout. Any error is printed on stderr and
//! the process exits with status 1.

use tfgrid_vclient::cli;
use tfgrid_vclient::cli::utils::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
