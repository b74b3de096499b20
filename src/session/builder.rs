use std::sync::Arc;
use crate::{
    actions::AuxiliaryActions,
    backend::{Backend, HttpBackend},
    config::ClientConfig,
    error::Result,
    metrics::MetricsCollector,
    notify::{LogNotifier, Notifier},
};

use super::controller::GenerationController;

/// Builder for constructing a [`GenerationController`]
pub struct ControllerBuilder {
    config: Option<ClientConfig>,
    backend: Option<Arc<dyn Backend>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl ControllerBuilder {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self {
            config: None,
            backend: None,
            notifier: None,
        }
    }

    /// Set the client configuration
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a specific backend instead of HTTP
    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Route user-facing messages somewhere other than the log
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build the controller
    pub fn build(self) -> Result<GenerationController> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let backend = match self.backend {
            Some(backend) => backend,
            None => Arc::new(HttpBackend::new(config.clone())?),
        };
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(LogNotifier));

        let metrics = MetricsCollector::new(config.monitoring.enable_metrics);
        let actions = AuxiliaryActions::new(backend.clone(), notifier.clone(), config.upload.clone());

        Ok(GenerationController::new(
            backend,
            notifier,
            actions,
            metrics,
            config.generation.form,
            config.generation.rag_enabled,
        ))
    }
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
