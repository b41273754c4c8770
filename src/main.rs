mod config;
mod error;
mod gemini;
mod image_client;
mod llm_client;
mod logging;
mod models;
mod request_id;
mod router;

use clap::Parser;
use config::Config;
use notify::{EventKind, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "describe-image")]
#[command(about = "Describes newspaper front pages with Gemini")]
struct Args {
    /// Overrides server.ip from the config file
    #[arg(short, long)]
    ip: Option<String>,

    /// Overrides server.port from the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to an optional YAML config file, reloaded on change
    #[arg(short, long)]
    config: Option<String>,

    /// trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Also write logs to this file (size-capped)
    #[arg(long)]
    log_file: Option<String>,

    /// socks and http proxy for outbound calls, example: socks5://192.168.0.2:10080
    #[arg(long)]
    proxy: Option<String>,
}

async fn watch_config_file(config_path: &str, config: &Arc<RwLock<Config>>) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel(100);

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            if let Err(e) = tx.blocking_send(event) {
                eprintln!("Failed to send event: {}", e);
            }
        }
    })?;

    watcher.watch(Path::new(config_path), RecursiveMode::NonRecursive)?;

    while let Some(event) = rx.recv().await {
        if let EventKind::Modify(_) = event.kind {
            info!("Config file modified, attempting to reload");
            match config::reload_into(config_path, config).await {
                Ok(()) => info!("Configuration reloaded successfully"),
                Err(e) => error!("Failed to reload configuration, keeping previous: {}", e),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::init_logging(logging::parse_level(&args.log_level), args.log_file.as_deref());

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(ip) = args.ip {
        config.server.ip = ip;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    match &args.config {
        Some(path) => info!("Configuration loaded successfully from: {}", path),
        None => info!("No config file given, using defaults"),
    }
    if config.api_key().is_err() {
        warn!(
            "{} is not set; requests will fail until it is configured",
            config::API_KEY_ENV
        );
    }

    let bind_address = format!("{}:{}", config.server.ip, config.server.port);
    let request_timeout = config.request_timeout();
    let config = Arc::new(RwLock::new(config));

    if let Some(config_path) = args.config.clone() {
        let config_for_watcher = config.clone();
        tokio::spawn(async move {
            if let Err(e) = watch_config_file(&config_path, &config_for_watcher).await {
                warn!("Config file watcher error: {}", e);
            }
        });
    }

    let client_builder = reqwest::Client::builder().timeout(request_timeout);
    let client_builder = if let Some(proxy) = &args.proxy {
        client_builder.proxy(reqwest::Proxy::all(proxy)?)
    } else {
        client_builder
    };
    let http_client = Arc::new(client_builder.build()?);

    let app_state = router::AppState::new(config, http_client);
    let app = router::app(app_state, request_timeout);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Server started on http://{}", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
