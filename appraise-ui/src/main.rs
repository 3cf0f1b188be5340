//! appraise-ui - House price prediction form service
//!
//! Serves the prediction form, hosts the prediction controller and relays
//! its state to the browser over SSE.

use anyhow::Result;
use appraise_common::config::{ConfigOverrides, ServiceConfig, SweepPolicy, TomlConfig};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use appraise_ui::services::HttpPredictor;
use appraise_ui::{bind_listener, build_router, AppState, ControllerSettings, PredictionController};

#[derive(Parser, Debug)]
#[command(name = "appraise-ui")]
#[command(about = "House price prediction form service")]
#[command(version)]
struct Args {
    /// TOML config file (defaults to the platform config location)
    #[arg(short, long, env = "APPRAISE_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the remote prediction endpoint
    #[arg(long, env = "APPRAISE_PREDICTOR_URL")]
    predictor_url: Option<String>,

    /// Timeout for each prediction request, in milliseconds
    #[arg(long, env = "APPRAISE_REQUEST_TIMEOUT_MS")]
    request_timeout_ms: Option<u64>,

    /// Address to bind
    #[arg(long, env = "APPRAISE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "APPRAISE_PORT")]
    port: Option<u16>,

    /// Log level when RUST_LOG is not set
    #[arg(long, env = "APPRAISE_LOG_LEVEL")]
    log_level: Option<String>,

    /// all_or_nothing or best_effort
    #[arg(long, env = "APPRAISE_SWEEP_POLICY")]
    sweep_policy: Option<SweepPolicy>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            predictor_url: self.predictor_url.clone(),
            request_timeout_ms: self.request_timeout_ms,
            host: self.host.clone(),
            port: self.port,
            log_level: self.log_level.clone(),
            sweep_policy: self.sweep_policy,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Step 1: Initialize tracing first; config loading logs through it
    let log_control = appraise_ui::logging::init(args.log_level.as_deref());

    // Step 2: Resolve configuration (CLI → ENV → TOML → defaults)
    let (toml_config, config_path) = TomlConfig::load_or_default(args.config.as_deref())?;
    let config = ServiceConfig::resolve(&args.overrides(), &toml_config)?;
    log_control.apply_level(&config.log_level)?;

    info!(
        "Starting appraise-ui (house price prediction) v{}",
        env!("CARGO_PKG_VERSION")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("Config file: none (using defaults)"),
    }
    info!("Predictor: {}", config.predictor_url);
    info!(
        "Request timeout: {:?}, sweep policy: {}",
        config.request_timeout, config.sweep_policy
    );

    // Step 3: Prediction client and controller
    let predictor = HttpPredictor::new(&config.predictor_url, config.request_timeout)?;
    let controller = Arc::new(PredictionController::new(
        Arc::new(predictor),
        ControllerSettings::from(&config),
    ));

    // Step 4: Start server
    let app = build_router(AppState::new(controller));
    let (listener, local_addr) = bind_listener(&config.bind_address()).await?;
    info!("Listening on http://{}", local_addr);
    info!("Health check: http://{}/health", local_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
