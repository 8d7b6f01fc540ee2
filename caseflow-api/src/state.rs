//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use caseflow_workflow::WorkflowEngine;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<WorkflowEngine>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(engine: Arc<WorkflowEngine>) -> Self {
        Self {
            engine,
            start_time: Instant::now(),
        }
    }
}
