//! Tracing subscriber initialization.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

const DEFAULT_FILTER: &str = "caseflow_api=debug,caseflow_workflow=debug,tower_http=debug,info";

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    /// Environment (production, staging, development)
    pub environment: String,
    /// JSON lines when true, human-readable otherwise.
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: std::env::var("CASEFLOW_SERVICE_NAME")
                .unwrap_or_else(|_| "caseflow-api".to_string()),
            environment: std::env::var("CASEFLOW_ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            json_logs: std::env::var("CASEFLOW_JSON_LOGS")
                .map(|s| s != "false" && s != "0")
                .unwrap_or(true),
        }
    }
}

/// Install the global subscriber. Call once at startup; `RUST_LOG`
/// overrides the default filter.
pub fn init_tracing(config: &TelemetryConfig) -> ApiResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if config.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    installed.map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(
        service_name = config.service_name,
        environment = config.environment,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(())
}
