//! Shared state handed to every worker's `App`.

use crate::{
    config::{MetricsConfig, ServerConfig},
    services::{AppMetrics, RequestBudget, SharedCatalog},
};

#[derive(Clone)]
pub struct AppState {
    pub server: ServerConfig,
    pub budget: RequestBudget,
    pub catalog: SharedCatalog,
    pub metrics: AppMetrics,
    pub metrics_config: MetricsConfig,
}

impl AppState {
    /// State with a fresh metrics registry and metrics enabled.
    pub fn new(
        server: ServerConfig,
        budget: RequestBudget,
        catalog: SharedCatalog,
    ) -> Result<Self, prometheus::Error> {
        Ok(Self {
            server,
            budget,
            catalog,
            metrics: AppMetrics::new()?,
            metrics_config: MetricsConfig::default(),
        })
    }

    pub fn with_metrics_config(mut self, metrics_config: MetricsConfig) -> Self {
        self.metrics_config = metrics_config;
        self
    }
}
