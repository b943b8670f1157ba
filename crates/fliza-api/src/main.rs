//! Fliza REST API and WebSocket server entry point.
//!
//! Binary name: `fliza`
//!
//! Parses CLI arguments, initializes the database and adapters, then
//! serves the chat/vision/design/history endpoints plus the realtime
//! WebSocket push channel.

mod http;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use http::router::build_router;
use state::AppState;

#[derive(Debug, Parser)]
#[command(name = "fliza", about = "Fliza chat backend", version)]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value_t = 3000, env = "FLIZA_PORT")]
    port: u16,

    /// Data directory (defaults to $FLIZA_DATA_DIR or ~/.fliza).
    #[arg(long, env = "FLIZA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,fliza=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let data_dir = cli.data_dir.unwrap_or_else(state::default_data_dir);
    let state = AppState::init(data_dir).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "fliza listening");

    axum::serve(listener, build_router(state)).await?;

    Ok(())
}
