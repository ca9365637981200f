//! Microblog feed store binary.
//!
//! # Usage
//!
//! ```bash
//! # In-memory feed (development)
//! microblog-server --bind 127.0.0.1:8080
//!
//! # Durable feed
//! microblog-server --bind 0.0.0.0:8080 --db feed.redb
//! ```

use std::path::PathBuf;

use clap::Parser;
use microblog_server::{DEFAULT_BIND, Server, ServerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Microblog feed store server
#[derive(Parser, Debug)]
#[command(name = "microblog-server")]
#[command(about = "Append-only signed message feed")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = DEFAULT_BIND)]
    bind: String,

    /// Path to the redb database (in-memory when omitted)
    #[arg(long)]
    db: Option<PathBuf>,

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

    tracing::info!("Microblog server starting");

    let config = ServerConfig { bind_address: args.bind, db_path: args.db };
    let server = Server::bind(config).await?;

    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
