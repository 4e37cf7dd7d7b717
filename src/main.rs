use std::env;
use std::path::PathBuf;

use anyhow::Context;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

use sagewalk::app::{App, AppOptions, Script};
use sagewalk::formatter::TickFormatter;

fn init_tracing() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().event_format(TickFormatter))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber).context("failed to install tracing subscriber")
}

fn options_from_env() -> anyhow::Result<AppOptions> {
    let mut options = AppOptions::default();
    if let Some(dir) = env::var_os("SAGEWALK_MAP_DIR") {
        options.map_dir = Some(PathBuf::from(dir));
    }
    if let Some(dir) = env::var_os("SAGEWALK_SAVE_DIR") {
        options.save_dir = Some(PathBuf::from(dir));
    }
    if let Ok(ticks) = env::var("SAGEWALK_TICKS") {
        options.ticks = ticks.parse().with_context(|| format!("invalid SAGEWALK_TICKS: {ticks}"))?;
    }
    if let Ok(seed) = env::var("SAGEWALK_SEED") {
        options.seed = Some(seed.parse().with_context(|| format!("invalid SAGEWALK_SEED: {seed}"))?);
    }
    if env::var_os("SAGEWALK_FAST").is_some() {
        options.realtime = false;
    }
    Ok(options)
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let options = options_from_env()?;
    info!(?options, "Starting sagewalk");

    let mut app = App::new(options, Script::demo()).context("failed to start the game")?;
    app.run();
    Ok(())
}
