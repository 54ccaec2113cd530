//! Silvia API service.
//!
//! HTTP server for GeoTIFF upload and band previews, plus a Sentinel-2
//! true colour composite proxy backed by the Sentinel Hub Process API.

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use sentinel_hub::{SentinelHubConfig, DEFAULT_BASE_URL, DEFAULT_TOKEN_URL};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use silvia_api::config::{load_credentials, AppConfig};
use silvia_api::create_router;
use silvia_api::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "silvia-api")]
#[command(about = "GeoTIFF preview and satellite imagery API server")]
struct Args {
    /// Listen address
    #[arg(short, long, env = "SILVIA_LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    listen: String,

    /// Directory where uploaded rasters are stored
    #[arg(long, env = "SILVIA_UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Directory with index.html, silvia.html, viewer.html and static assets
    #[arg(long, env = "SILVIA_FRONTEND_DIR", default_value = "frontend")]
    frontend_dir: PathBuf,

    /// JSON file with sh_client_id and sh_client_secret
    #[arg(long, env = "SILVIA_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Sentinel Hub API base URL
    #[arg(long, env = "SENTINEL_HUB_BASE_URL", default_value = DEFAULT_BASE_URL)]
    sentinel_hub_base_url: String,

    /// Sentinel Hub OAuth token URL
    #[arg(long, env = "SENTINEL_HUB_TOKEN_URL", default_value = DEFAULT_TOKEN_URL)]
    sentinel_hub_token_url: String,

    /// Timeout for Sentinel Hub requests, in seconds
    #[arg(long, default_value = "60")]
    sentinel_hub_timeout: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long)]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    } else if let Some(threads) = env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
    {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Starting Silvia API server");

    let listen_addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    let sentinel_hub = load_credentials(&args.config).map(|creds| {
        let mut sh = SentinelHubConfig::new(creds.sh_client_id, creds.sh_client_secret);
        sh.base_url = args.sentinel_hub_base_url.clone();
        sh.token_url = args.sentinel_hub_token_url.clone();
        sh.request_timeout = Duration::from_secs(args.sentinel_hub_timeout);
        sh
    });

    let config = AppConfig::new(&args.upload_dir, &args.frontend_dir)
        .with_listen_addr(listen_addr)
        .with_sentinel_hub(sentinel_hub);

    info!(
        upload_dir = %config.upload_dir.display(),
        frontend_dir = %config.frontend_dir.display(),
        satellite_enabled = config.sentinel_hub.is_some(),
        "Configuration loaded"
    );

    let state = Arc::new(AppState::new(config)?.with_prometheus(prometheus_handle));
    let app = create_router(state);

    info!(address = %listen_addr, "Listening");

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
