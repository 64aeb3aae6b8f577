//! presidio-redact CLI entry point.

use presidio_redaction::cli::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = cli::execute(cli).await {
        tracing::error!(category = e.category(), "{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
