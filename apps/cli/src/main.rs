#![allow(clippy::print_stdout)]

mod handlers;
mod models;

use crate::handlers::{greet, send};
use crate::models::args::{AppCommands, Cli};
use anyhow::{Context, Result};
use clap::Parser;
use sfetch::client::{ClientConfig, SecureClient};
use sfetch::domain::Settings;
use sfetch::kernel::config::load_settings;
use sfetch_logger::{LevelFilter, Logger};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref()).context("Configuration is malformed")?;
    apply_overrides(&mut settings, &cli);

    let level: LevelFilter = settings.log.level.parse().context("Invalid log level")?;
    let _log = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(level)
        .debug(settings.debug)
        .init()?;

    let config = ClientConfig::from_settings(&settings).context("Invalid client configuration")?;
    let client = SecureClient::new(config)?;

    match cli.command {
        AppCommands::Greet { name } => greet::greet(&client, &name).await,
        AppCommands::Send { method, path, data, headers } => {
            send::send(&client, &method, &path, data, &headers).await
        },
    }
}

fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(endpoint) = &cli.endpoint {
        settings.client.endpoint = Some(endpoint.clone());
    }
    if let Some(timeout) = cli.timeout {
        settings.client.timeout_secs = timeout;
    }
    if cli.debug {
        settings.debug = true;
    }
}
