//! Configuration for the event manager.

use crate::dispatcher::DispatcherConfig;

/// Configuration for an [`EventManager`](crate::EventManager)
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Instance name, used in logs
    pub name: String,

    /// Dispatcher configuration
    pub dispatcher: DispatcherConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            dispatcher: DispatcherConfig::default(),
        }
    }
}

impl ManagerConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the instance name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Run at most one publish at a time
    pub fn enable_lock(mut self, enable: bool) -> Self {
        self.dispatcher.enable_lock = enable;
        self
    }

    /// Wrap each publish in a tracing span
    pub fn enable_tracing(mut self, enable: bool) -> Self {
        self.dispatcher.enable_tracing = enable;
        self
    }

    /// Configure dispatcher
    pub fn dispatcher_config<F>(mut self, f: F) -> Self
    where
        F: FnOnce(DispatcherConfig) -> DispatcherConfig,
    {
        self.dispatcher = f(self.dispatcher);
        self
    }
}

/// Preset configurations for common use cases
impl ManagerConfig {
    /// Publishes never interleave
    pub fn serialized() -> Self {
        Self::default().enable_lock(true)
    }

    /// Configuration for testing: serialized publishes, each in its own span
    pub fn test() -> Self {
        Self::default().name("test").enable_lock(true).enable_tracing(true)
    }
}
