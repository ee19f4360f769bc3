//! Early Student At-Risk Detection - Main Entry Point
//!
//! Loads the model and schema artifacts, then serves the prediction form.

use anyhow::{Context, Result};
use std::sync::Arc;
use student_risk::{
    config::{AppConfig, LoggingConfig},
    metrics::{MetricsReporter, PredictionMetrics},
    models::Artifacts,
    web::create_router,
    RiskAssessor,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!("student_risk={},tower_http=info", logging.level))
    })?;

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    init_tracing(&config.logging)?;

    info!("Starting Early Student At-Risk Detection");
    info!(
        "Risk bands: moderate>={:.2}, high>={:.2}",
        config.risk_bands.moderate, config.risk_bands.high
    );

    // Missing or invalid artifacts are fatal: never serve without a model
    let artifacts = Artifacts::global(&config.artifacts).context("Failed to load artifacts")?;

    // Initialize metrics
    let metrics = Arc::new(PredictionMetrics::new());
    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let assessor = Arc::new(RiskAssessor::new(
        artifacts,
        config.risk_bands.clone(),
        metrics.clone(),
    ));
    let app = create_router(assessor);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Serving prediction form on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Print final summary
    info!("Shutting down...");
    metrics.print_summary();

    Ok(())
}
