use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, info};
use ollama::api::Client;
use ollama::progress::{BarDisplay, DigestLabel};
use std::fs;
use std::io;
use std::path::PathBuf;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use cli::handlers;
use config::Config;

const LOG_ENV: &str = "RUST_LOG";

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(env!("CARGO_PKG_NAME"))
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join(format!("{}.log", env!("CARGO_PKG_NAME")));

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // Without RUST_LOG the filter admits everything and the max level gates output
    let env = env_logger::Env::default().filter_or(LOG_ENV, "trace");
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(target))
        .init();

    if std::env::var_os(LOG_ENV).is_none() {
        log::set_max_level(LevelFilter::Info);
    }

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Apply the configured level unless RUST_LOG already decided
fn apply_log_level(level: Option<&str>) {
    if std::env::var_os(LOG_ENV).is_some() {
        return;
    }

    if let Some(level) = level {
        match level.parse::<LevelFilter>() {
            Ok(filter) => log::set_max_level(filter),
            Err(_) => log::warn!("Unknown log level in config: {}", level),
        }
    }
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    let endpoint = config.endpoint();
    info!("Starting application against {}", endpoint);

    let client = Client::new(&endpoint).context("Failed to create API client")?;
    let labels = DigestLabel::new(config.progress.digest_label_length);

    match &cli.command {
        Commands::Create { model, file } => handlers::create_model(&client, model, file, &mut io::stdout()).await,
        Commands::Run { model, prompt } => {
            handlers::run_model(&client, model, prompt, config.options.clone(), labels, cli.is_verbose()).await
        }
        Commands::Pull { model, credentials } => {
            handlers::pull_model(&client, model, credentials, BarDisplay::new("pulling"), labels).await?;
            Ok(())
        }
        Commands::Push { model, credentials } => {
            handlers::push_model(&client, model, credentials, BarDisplay::new("pushing"), labels).await?;
            Ok(())
        }
        Commands::List => handlers::list_models(&client, &mut io::stdout()).await,
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Load configuration
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config
        .apply_env(|key| std::env::var(key).ok())
        .context("Invalid environment override")?;

    apply_log_level(config.log_level.as_deref());
    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).await
}

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(1);
    }
}
