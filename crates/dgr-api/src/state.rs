//! # Application State
//!
//! Shared state for the Axum application: the registry instance and
//! service configuration.

use std::sync::Arc;

use dgr_registry::Registry;

/// Service configuration, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    /// Static bearer token protecting the API surface. `None` disables
    /// authentication (local development and tests).
    pub auth_token: Option<String>,
}

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The civil registry.
    pub registry: Arc<Registry>,
    /// Service configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Create application state over an existing registry.
    pub fn new(registry: Arc<Registry>, config: ApiConfig) -> Self {
        Self { registry, config }
    }

    /// State over a fresh, empty registry with default configuration.
    /// Test and development convenience.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(Registry::new()), ApiConfig::default())
    }
}
