//! salon-client - Authenticated client for the salon booking API
//!
#![doc = "Main entry point for the salon-client command-line tool."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use salon_client::cli::{Cli, Commands};
use salon_client::commands;
use salon_client::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config = Config::load(cli.config_path(), &cli)?;

    // Validate configuration
    config.validate()?;

    let client = commands::build_client(&config)?;
    let mut out = std::io::stdout();

    match cli.command {
        Commands::Login {
            access_token,
            refresh_token,
        } => {
            tracing::info!("Storing credentials");
            commands::login(&client, access_token, refresh_token, &mut out)
        }
        Commands::Logout => commands::logout(&client, &mut out),
        Commands::Status => commands::status(&client, &mut out),
        Commands::Request {
            method,
            path,
            body,
            headers,
        } => {
            tracing::debug!("Sending {} {}", method, path);
            commands::request(&client, &method, &path, body, &headers, &mut out).await
        }
        Commands::Refresh => {
            tracing::info!("Forcing token refresh");
            commands::refresh(&client, &mut out).await
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool, json: bool) {
    let default_directive = if verbose {
        "salon_client=debug"
    } else {
        "salon_client=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
