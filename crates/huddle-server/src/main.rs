//! Huddle server binary.
//!
//! # Usage
//!
//! ```bash
//! # Serve on the default port
//! huddle-server
//!
//! # Custom bind address and verbose relay logging
//! huddle-server --bind 127.0.0.1:8080 --log-level debug
//! ```

use clap::Parser;
use huddle_server::{RuntimeConfig, Server};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Huddle signaling relay server
#[derive(Parser, Debug)]
#[command(name = "huddle-server")]
#[command(about = "WebSocket signaling relay for huddle rooms")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    bind: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("huddle server starting");

    let config = RuntimeConfig { bind_address: args.bind };
    let server = Server::bind(config).await?;

    server.run().await?;

    Ok(())
}
