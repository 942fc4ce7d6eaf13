//! # Application State
//!
//! Shared state handed to every route handler through the `State`
//! extractor. Cloning is cheap; all clones share one orchestrator.

use std::sync::Arc;

use crate::orchestrator::StatusOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<StatusOrchestrator>,
    /// Whether `app` adds the HTTP access log layer.
    pub access_logging: bool,
}

impl AppState {
    pub fn new(orchestrator: StatusOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            access_logging: true,
        }
    }

    pub fn with_access_logging(mut self, enabled: bool) -> Self {
        self.access_logging = enabled;
        self
    }
}
