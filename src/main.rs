use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use multicast_m3u::{
    config::{Config, EmptyResultPolicy},
    pipeline::Orchestrator,
};

#[derive(Parser)]
#[command(name = "multicast-m3u")]
#[command(version)]
#[command(about = "Scrapes a multicast channel listing and writes one M3U playlist per udpxy relay")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Directory for the generated playlists (overrides config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Channel listing URL (overrides config file)
    #[arg(short = 'u', long, value_name = "URL")]
    source_url: Option<String>,

    /// Read the listing from a saved page instead of fetching it
    #[arg(short, long, value_name = "PATH")]
    input_file: Option<PathBuf>,

    /// Fall back to a headless browser when static extraction finds nothing
    #[arg(long)]
    render: bool,

    /// What to do when the listing is unreachable or empty: fallback or fail
    #[arg(long, value_name = "POLICY")]
    policy: Option<EmptyResultPolicy>,

    /// Write the run report as JSON
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Print the built-in default configuration and exit
    #[arg(long)]
    write_default_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("multicast_m3u={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.write_default_config {
        print!("{}", Config::default_toml()?);
        return Ok(());
    }

    info!("Starting multicast-m3u v{}", env!("CARGO_PKG_VERSION"));

    let mut config =
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?;

    // Override config with CLI arguments
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(source_url) = cli.source_url {
        config.source.url = source_url;
    }
    if cli.render {
        config.render.enabled = true;
    }
    if let Some(policy) = cli.policy {
        config.fallback.policy = policy;
    }
    config.validate().context("Invalid configuration")?;

    info!(
        "Generating playlists for {} relays into {}",
        config.relays.len(),
        config.output_dir.display()
    );

    let mut orchestrator = Orchestrator::from_config(config, cli.input_file)?;
    let report = orchestrator.run().await?;

    if let Some(path) = cli.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Run report written to {}", path.display());
    }

    Ok(())
}
