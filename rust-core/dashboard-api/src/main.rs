// SPDX-License-Identifier: PMPL-1.0-or-later
//! dashctl: read and delete dashboards through the version-matched API.
//!
//! Connection settings come from the `DASHBOARD_API_*` environment
//! variables; output is JSON on stdout.

use clap::{Parser, Subcommand};

use dashboard_api::schema::VersionsQuery;
use dashboard_api::{DashboardApiConfig, DashboardApiProvider};

#[derive(Parser, Debug)]
#[command(name = "dashctl", version, about = "Dashboard API client")]
struct Cli {
    /// Backend base URL (overrides DASHBOARD_API_URL).
    #[arg(long)]
    url: Option<String>,

    /// Explicit API version tag (overrides DASHBOARD_API_VERSION).
    #[arg(long = "api-version")]
    api_version: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the active API version.
    Version,
    /// Fetch a dashboard.
    Get {
        uid: String,
        /// Return the native v2 shape.
        #[arg(long)]
        v2: bool,
        /// Extra query parameter as key=value (repeatable).
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Delete a dashboard.
    Delete { uid: String },
    /// List saved versions of a dashboard.
    Versions {
        uid: String,
        #[arg(long)]
        limit: Option<u32>,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = DashboardApiConfig::from_env();
    if let Some(url) = cli.url {
        config.base_url = url;
    }
    if cli.api_version.is_some() {
        config.api_version = cli.api_version;
    }

    let provider = DashboardApiProvider::new(config)?;

    let output = match cli.command {
        Command::Version => serde_json::json!({ "version": provider.api_version()? }),
        Command::Get { uid, v2: true, params } => {
            serde_json::to_value(provider.dashboard_api_v2()?.get_dashboard_dto(&uid, &params).await?)?
        }
        Command::Get { uid, v2: false, params } => {
            serde_json::to_value(provider.dashboard_api()?.get_dashboard_dto(&uid, &params).await?)?
        }
        Command::Delete { uid } => {
            serde_json::to_value(provider.dashboard_api()?.delete_dashboard(&uid, true).await?)?
        }
        Command::Versions { uid, limit } => {
            let query = VersionsQuery {
                limit,
                continue_token: None,
            };
            serde_json::to_value(provider.dashboard_api()?.list_versions(&uid, &query).await?)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
