//! Caseflow API Server Entry Point
//!
//! Loads engine and API configuration from the environment, builds an
//! in-memory engine and serves the Axum router.

use std::sync::Arc;

use axum::Router;
use caseflow_api::telemetry::{init_tracing, TelemetryConfig};
use caseflow_api::{create_api_router, ApiConfig, ApiError, ApiResult};
use caseflow_core::{EngineConfig, SystemClock};
use caseflow_workflow::WorkflowEngine;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let engine_config = EngineConfig::from_env()
        .map_err(|e| ApiError::internal_error(format!("Invalid engine configuration: {}", e)))?;
    let api_config = ApiConfig::from_env()?;

    tracing::info!(
        sla_warning_hours = engine_config.sla_warning_hours,
        rca_review_gate = ?engine_config.rca_review_gate,
        "Engine configuration loaded"
    );

    let engine = Arc::new(WorkflowEngine::in_memory(
        engine_config,
        Arc::new(SystemClock),
    ));
    let app: Router = create_api_router(engine, &api_config);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting Caseflow API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
