mod cli;
mod commands;
mod config;
mod shell;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use dbquery_client::{http_gateways, Transport};
use dbquery_core::config::{load_dotenv, Config};
use dbquery_session::SessionCoordinator;

use crate::cli::{CliArgs, Command};
use crate::config::CliConfig;
use crate::shell::Shell;
use crate::terminal::Terminal;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        Terminal::new().print_error(&format!("{:#}", e)).ok();
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    load_dotenv();
    let file_config = CliConfig::load(args.config.as_deref())
        .context("failed to load configuration")?;
    let settings = file_config.resolve(&Config::from_env(), args.server.as_deref(), args.timeout);
    settings.validate().context("invalid configuration")?;
    settings.log_summary();

    let transport = Transport::new(settings.api_url(), settings.timeout())
        .context("failed to build HTTP client")?;
    let coord = Arc::new(SessionCoordinator::new(http_gateways(transport)));
    if let Some(model) = &settings.default_model {
        info!(model = %model, "Using configured default model");
        coord.select_llm_model(model);
    }

    match args.command() {
        Command::Shell => Shell::new(coord).run(settings.api_url()).await,
        command => commands::run(command, &coord, &Terminal::new()).await,
    }
}
