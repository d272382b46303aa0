#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tasklane::api::{ApiClient, TokenStore};
use tasklane::app::TimelineApp;
use tasklane::config::{AppConfig, AppPaths};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tasklane=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let paths = AppPaths::discover();
    let config = AppConfig::load_or_init(&paths.config_file)
        .unwrap_or_else(|e| {
            warn!(error = %format!("{e:#}"), "using default config");
            AppConfig::default()
        })
        .with_env_overrides();

    let tokens = TokenStore::load(&paths.tokens_file).unwrap_or_else(|e| {
        warn!(error = %e, "stored tokens unreadable, starting logged out");
        TokenStore::in_memory()
    });
    let client = ApiClient::new(&config.api_base_url, tokens, config.request_timeout())
        .context("Failed to create HTTP client")?;
    info!(api = %config.api_base_url, config = %paths.config_file.display(), "starting");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Tasklane"),
        ..Default::default()
    };

    eframe::run_native(
        "Tasklane",
        options,
        Box::new(move |cc| Ok(Box::new(TimelineApp::new(cc, config, client)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe failed: {e}"))
}
