mod utils;

pub mod bridge;
pub mod capture;
pub mod config;
pub mod models;
pub mod settings;
pub mod suggest;
pub mod tone;

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use bridge::{BackgroundRouter, ContentFlow, Host, LocalChannel};
use capture::CaptureController;
use config::EchoConfig;
use settings::SettingsStore;
use suggest::{GeminiClient, SuggestionRequester};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

const DEFAULT_DATA_DIR: &str = "echotype-data";

/// Wires the store, tracker, router and content flow around one data
/// directory.
pub fn build_host(data_dir: PathBuf) -> Result<Host> {
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let config = EchoConfig::load(&data_dir.join("config.json"))?;
    let store = Arc::new(SettingsStore::new(data_dir.join("store.json"))?);

    let capture = CaptureController::new(store.clone(), &config.capture);
    let client = GeminiClient::new(config.generation.clone()).map_err(|err| anyhow!(err))?;
    let requester = SuggestionRequester::new(Arc::new(client));
    let router = BackgroundRouter::new(store.clone(), requester).with_capture(capture.clone());
    let channel = Arc::new(LocalChannel::new(router.clone()));
    let content = ContentFlow::new(store.clone(), channel);

    Ok(Host::new(store, capture, router, content))
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("EchoType starting up...");

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async move {
        let host = build_host(data_dir)?;
        let shutdown = CancellationToken::new();

        let ctrl_c = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_c.cancel();
            }
        });

        host.serve(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            shutdown,
        )
        .await
    })
}
