use std::sync::Arc;

use adpulse_core::{config::Config, source::ReportingSource};

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// Upstream ad-serving data. Swappable: the binary wires in the mock
    /// ad manager, tests wire in fixed reports.
    pub source: Arc<dyn ReportingSource>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(source: impl ReportingSource, config: Config) -> Self {
        Self {
            source: Arc::new(source),
            config: Arc::new(config),
        }
    }
}
