//! Command-line interface definition for the salon client
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for session management and authenticated requests.

use clap::{Parser, Subcommand};

/// Configuration file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// salon-client - Authenticated client for the salon booking API
///
/// Stores an access/refresh token pair and sends requests that recover
/// from expired access tokens transparently.
#[derive(Parser, Debug, Clone)]
#[command(name = "salon-client")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file [default: config/config.yaml]
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Override the API base URL from config
    #[arg(long)]
    pub base_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Store an access/refresh token pair
    ///
    /// Prefer the environment variables over the flags so the tokens stay
    /// out of the process list and shell history.
    Login {
        /// Access token presented as `Authorization: Bearer`
        #[arg(long, env = "SALON_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,

        /// Refresh token exchanged for new access tokens
        #[arg(long, env = "SALON_REFRESH_TOKEN", hide_env_values = true)]
        refresh_token: String,
    },

    /// Remove stored tokens
    Logout,

    /// Show whether tokens are stored
    Status,

    /// Send an authenticated request
    Request {
        /// HTTP method (GET, POST, ...)
        method: String,

        /// Path relative to the configured base URL
        path: String,

        /// JSON request body
        #[arg(long)]
        body: Option<String>,

        /// Extra header as `Name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },

    /// Force a token refresh
    Refresh,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the configuration file path, falling back to
    /// [`DEFAULT_CONFIG_PATH`].
    pub fn config_path(&self) -> &str {
        self.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH)
    }
}

/// Splits a `Name: value` header argument.
///
/// Returns `None` when there is no colon or the name is empty.
pub fn parse_header(raw: &str) -> Option<(String, String)> {
    let (name, value) = raw.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
