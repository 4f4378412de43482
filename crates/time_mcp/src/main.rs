use std::env;
use tracing_subscriber::{self, EnvFilter};

mod cli;
mod core;
mod server;

/// Time MCP Server
///
/// A comprehensive example MCP server demonstrating:
/// - Tools: Current time, calendar arithmetic, timezone conversion, timezone catalog
/// - Resources: Server status and help documentation
///
/// Usage: npx @modelcontextprotocol/inspector cargo run --bin mcp-server-time
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments before anything else so an invalid default
    // timezone fails fast
    let config = cli::Cli::parse_config()?;

    // Initialize logging only if LOG_LEVEL environment variable is set
    if let Ok(log_level) = env::var("LOG_LEVEL") {
        // Initialize the tracing subscriber with stderr logging; stdout
        // carries the MCP transport
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
            )
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .init();

        tracing::info!("Starting Time MCP server with log level: {}", log_level);
    }

    if let Err(e) = server::run(config).await {
        // Only log error if logging is initialized
        if env::var("LOG_LEVEL").is_ok() {
            tracing::error!("Error running Time MCP server: {}", e);
        }
        return Err(e);
    }

    Ok(())
}
