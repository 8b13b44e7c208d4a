use anyhow::Context;
use sfetch::domain::Settings;
use sfetch::kernel::config::load_settings;
use sfetch_logger::{LevelFilter, Logger};
use sfetch_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings(std::env::args().nth(1))
        .context("Critical: Configuration is malformed")?;
    let _log = init_logger(&settings)?;

    Server::builder().settings(settings).build()?.run().await
}

fn init_logger(settings: &Settings) -> anyhow::Result<Logger> {
    let level: LevelFilter = settings.log.level.parse().context("Invalid log level")?;
    let builder = Logger::builder().name(env!("CARGO_PKG_NAME")).level(level).debug(settings.debug);

    let logger = match &settings.log.dir {
        Some(dir) if settings.log.json => builder.path(dir).json().init()?,
        Some(dir) => builder.path(dir).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}
