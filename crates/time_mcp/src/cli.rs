use chrono_tz::Tz;
use clap::Parser;

use crate::core::error::{TimeServerError, TimeServerResult};
use crate::core::utils::DEFAULT_TIMEZONE;

/// Time MCP Server
///
/// A Model Context Protocol server providing timezone-aware time queries,
/// calendar arithmetic and timezone conversion.
///
/// ## Development
/// ```bash
/// npx @modelcontextprotocol/inspector cargo run --bin mcp-server-time
/// ```
///
/// ## Configuration
/// Add to your MCP client configuration:
/// ```json
/// {
///   "mcpServers": {
///     "time": {
///       "command": "mcp-server-time",
///       "args": ["--timezone", "Asia/Shanghai"],
///       "env": {
///         "LOG_LEVEL": "info"
///       }
///     }
///   }
/// }
/// ```
#[derive(Parser, Debug, Clone)]
#[command(name = "mcp-server-time")]
#[command(about = "A timezone-aware time MCP server with calendar arithmetic")]
#[command(version)]
#[command(
    long_about = "A Model Context Protocol (MCP) server that provides time operations. \nSupports current time queries, calendar arithmetic with month-overflow clamping, \ntimezone conversion and timezone catalog listing."
)]
pub struct Cli {
    /// Default IANA timezone applied when a tool call omits one.
    #[arg(
        long = "timezone",
        value_name = "TIMEZONE",
        help = "Default IANA timezone for tool calls that omit one",
        long_help = "Default IANA timezone (e.g. 'Asia/Shanghai', 'UTC') applied when a tool call \ndoes not name its own timezone. Every request may still override it per call."
    )]
    pub timezone: Option<String>,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct Config {
    pub default_timezone: Tz,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_timezone: DEFAULT_TIMEZONE,
        }
    }
}

impl Cli {
    /// Parse CLI arguments and convert to configuration
    pub fn parse_config() -> TimeServerResult<Config> {
        Self::parse().into_config()
    }

    pub(crate) fn into_config(self) -> TimeServerResult<Config> {
        let default_timezone = match self.timezone {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| TimeServerError::InvalidTimezone { timezone: name })?,
            None => DEFAULT_TIMEZONE,
        };

        Ok(Config { default_timezone })
    }
}
