//! Titanic Survival Predictor - Service Entry Point
//!
//! Loads the persisted model (training it first when bootstrapping is
//! configured), then serves the input form and JSON prediction endpoint.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use titanic_survival::{
    api::create_router,
    config::AppConfig,
    metrics::{MetricsReporter, SharedMetrics},
    models::{loader::ModelLoader, InferenceEngine},
    service::{ServiceInfo, ServiceState},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(config: &AppConfig) -> Result<()> {
    // LOG_LEVEL defaults to info, giving the `titanic_survival=info` directive
    let filter = EnvFilter::from_default_env().add_directive(
        format!("titanic_survival={}", config.logging.level)
            .parse()
            .with_context(|| format!("Invalid log level: {}", config.logging.level))?,
    );

    if config.logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;
    init_logging(&config)?;

    info!("Starting Titanic Survival Predictor");
    info!(
        app_env = %config.app_env,
        model = %config.artifacts.model_path,
        "Configuration loaded successfully"
    );

    // Load (or bootstrap) the model artifact
    let loader = ModelLoader::new(config.artifact_paths());
    let artifact = loader
        .load_or_bootstrap(
            config.bootstrap.dataset_path.as_deref().map(Path::new),
            config.bootstrap_params(),
        )
        .context("Failed to load model artifact")?;

    let engine = InferenceEngine::new(artifact);
    info!(
        version = engine.version(),
        features = engine.feature_names().len(),
        "Inference engine initialized"
    );

    // Initialize metrics
    let metrics = Arc::new(SharedMetrics::new());

    let info = ServiceInfo {
        app_env: config.app_env.clone(),
        model_name: config.model_name(),
        model_version: engine.version().to_string(),
    };
    let state = Arc::new(ServiceState::new(engine, metrics.clone(), info));

    // Start metrics reporter
    let interval = config.metrics.report_interval_secs;
    tokio::spawn(async move {
        MetricsReporter::new(metrics, interval).start().await;
    });

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, create_router(state))
        .await
        .context("Server error")?;

    info!("Service shutting down...");
    Ok(())
}
