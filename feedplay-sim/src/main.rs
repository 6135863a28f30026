//! # feedplay-sim
//!
//! Replays a JSON script of scroll, player and tap events through a
//! [`FeedSession`](feedplay_core::FeedSession) and prints the render
//! decision of every mounted item whenever the script says `print`.
//!
//! ```text
//! feedplay-sim feedplay-sim/scripts/demo.json
//! RUST_LOG=feedplay=trace \
//!     feedplay-sim --config feedplay.toml --fetch demo.json
//! ```

mod script;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use feedplay_config::{FeedConfig, FeedConfigSource};
use feedplay_contracts::CacheEngine;
use feedplay_core::BlobCacheEngine;
use feedplay_core::cache::TrackKind;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::script::{DryRunEngine, Runner, Script};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "feedplay-sim")]
#[command(about = "Replay scroll and player events through a feed session")]
struct Cli {
    /// Script to replay
    script: PathBuf,

    /// Config file (TOML or JSON). Falls back to the FEEDPLAY_CONFIG_* env
    /// vars and default file locations.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fetch prefetched uris for real instead of logging them
    #[arg(long, default_value_t = false)]
    fetch: bool,

    /// Print views as indented JSON
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedplay=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let (mut config, source) = match &cli.config {
        Some(path) => (
            FeedConfig::load_from_file(path)?,
            FeedConfigSource::File(path.clone()),
        ),
        None => FeedConfig::load_from_env()?,
    };
    info!(%source, "feed config loaded");
    for warning in config.validate().iter() {
        warn!(%warning, "config adjusted");
    }

    let raw = std::fs::read_to_string(&cli.script).with_context(|| {
        format!("failed to read script {}", cli.script.display())
    })?;
    let script = Script::parse(&raw)?;

    let engine: Arc<dyn CacheEngine> = if cli.fetch {
        Arc::new(BlobCacheEngine::from_config(&config.cache)?)
    } else {
        Arc::new(DryRunEngine)
    };

    let mut runner = Runner::from_config(config, engine, script.items)?;
    for (n, step) in script.steps.into_iter().enumerate() {
        let views = runner
            .apply(step)
            .await
            .with_context(|| format!("step {n} failed"))?;
        if let Some(views) = views {
            let rendered = if cli.pretty {
                serde_json::to_string_pretty(&views)?
            } else {
                serde_json::to_string(&views)?
            };
            println!("{rendered}");
        }
    }

    let cache = runner.session().cache();
    cache.flush().await;
    info!(
        mounted = runner.session().len(),
        prefetched = cache.tracking().len(TrackKind::Main),
        "script finished"
    );
    Ok(())
}
