//! miniapp-mcp - MCP stdio bridge for miniprogram UI automation.
//!
//! This binary runs the stdio MCP binding and forwards every tool call to
//! a running socket-binding automation host.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use miniapp_mcp::{McpServer, RemoteEndpoint};

/// MCP stdio bridge for miniprogram UI automation.
#[derive(Parser, Debug)]
#[command(name = "miniapp-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address of the automation host's socket binding.
    #[arg(long, default_value = "127.0.0.1:8888")]
    connect: String,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Log to stderr (not stdout, which is used for MCP protocol)
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(args).await {
        Ok(()) => {
            tracing::info!("Server exited cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Server error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    tracing::info!(
        "Starting {} v{}",
        miniapp_mcp::server::SERVER_NAME,
        miniapp_mcp::server::SERVER_VERSION
    );
    tracing::info!("Forwarding tool calls to {}", args.connect);

    let backend = Arc::new(RemoteEndpoint::new(args.connect));
    let server = McpServer::new(backend);
    server.run_stdio().await?;
    Ok(())
}
