use crate::models::inference::InferenceEngine;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Shared state for the scoring handlers
#[derive(Clone)]
pub struct AppState {
    /// Artifacts loaded once at startup, read-only afterwards
    pub engine: Arc<InferenceEngine>,

    /// Application start time
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(engine: Arc<InferenceEngine>) -> Self {
        Self {
            engine,
            started_at: Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }
}
