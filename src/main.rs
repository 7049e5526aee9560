use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

use newsdeck::app::{App, AppEvent};
use newsdeck::config::Config;
use newsdeck::feed::{FeedSource, HttpFeedSource, SampleFeedSource};
use newsdeck::ui;

/// Get the config directory path (~/.config/newsdeck/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("newsdeck"))
}

#[derive(Parser, Debug)]
#[command(name = "newsdeck", about = "Terminal news feed browser")]
struct Args {
    /// Path to a config file (defaults to ~/.config/newsdeck/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Feed API base URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Run against built-in sample data, no network
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&config_path).context("Failed to load configuration")?;

    if let Some(endpoint) = args.endpoint {
        config.endpoint = Some(endpoint);
    }

    let timeout = Duration::from_secs(config.request_timeout_secs);
    let source: Arc<dyn FeedSource> = match (&config.endpoint, args.offline) {
        (Some(endpoint), false) => {
            let endpoint = Url::parse(endpoint)
                .with_context(|| format!("Invalid endpoint URL: {}", endpoint))?;
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .context("Failed to build HTTP client")?;
            tracing::info!(endpoint = %endpoint, "Using HTTP feed source");
            Arc::new(HttpFeedSource::new(client, endpoint, timeout))
        }
        _ => {
            tracing::info!("Using built-in sample feed source");
            Arc::new(SampleFeedSource::new(
                config.page_size,
                Duration::from_millis(300),
            ))
        }
    };

    let mut app = App::new(source, &config);

    // Create event channel for background fetch tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    // Kick off the initial page-1 fetch before entering the loop
    if let Some(plan) = app.controller.refresh() {
        app.issue_fetch(plan, &event_tx);
    }

    // Run the TUI
    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
