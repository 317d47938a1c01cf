//! In-process Chat Room - Entry Point
//!
//! Builds a ChatServer and drives it with JSON commands read from stdin,
//! writing JSON events to stdout.

use std::env;
use std::sync::Arc;

use tokio::io::{self, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chat_room::{driver, ChatServer, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_room=trace
    // Logs go to stderr; stdout carries the event stream.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chat_room=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Mailbox capacity from CHAT_MAILBOX_CAPACITY, overridden by the first argument
    let mut config = Config::from_env();
    if let Some(raw) = env::args().nth(1) {
        config.apply_capacity(&raw);
    }

    info!("Chat room started (mailbox capacity {})", config.mailbox_capacity);

    let server = Arc::new(ChatServer::new(config));
    let stdin = BufReader::new(io::stdin());
    driver::run(server.clone(), stdin, io::stdout()).await?;

    info!("Chat room shutting down: {:?}", server.stats());
    Ok(())
}
