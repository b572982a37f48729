//! Builder pattern for constructing EventManager instances.

use crate::manager::config::ManagerConfig;
use crate::EventManager;
use tracing::info;

/// Builder for creating EventManager instances
#[derive(Debug, Default)]
pub struct EventManagerBuilder {
    config: ManagerConfig,
}

impl EventManagerBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom configuration
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure the event manager
    pub fn configure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ManagerConfig) -> ManagerConfig,
    {
        self.config = f(self.config);
        self
    }

    /// Set the instance name
    pub fn name(self, name: impl Into<String>) -> Self {
        self.configure(|c| c.name(name))
    }

    /// Serialize publishes behind a lock
    pub fn enable_lock(self, enable: bool) -> Self {
        self.configure(|c| c.enable_lock(enable))
    }

    /// Serialize publishes, keeping the rest of the configuration
    pub fn serialized(self) -> Self {
        self.enable_lock(true)
    }

    /// Build the EventManager
    pub fn build(self) -> EventManager {
        info!(
            name = %self.config.name,
            enable_lock = self.config.dispatcher.enable_lock,
            "Building EventManager"
        );
        EventManager::with_config(self.config)
    }
}
