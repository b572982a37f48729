//! The process-wide default manager.
//!
//! Created on first use. Libraries that want isolation, and tests, should
//! build their own [`EventManager`] instead.

use crate::listener::ListenerRef;
use crate::{Event, EventData, EventManager, Result};
use std::sync::OnceLock;

static DEFAULT_MANAGER: OnceLock<EventManager> = OnceLock::new();

/// The shared default manager, named `"default"`
pub fn default_manager() -> &'static EventManager {
    DEFAULT_MANAGER.get_or_init(|| EventManager::new("default"))
}

/// Register a listener on the default manager
pub fn listen(name: &str, listener: ListenerRef) -> Result<()> {
    default_manager().listen(name, listener)
}

/// Register a listener with a priority on the default manager
pub fn listen_with_priority(name: &str, listener: ListenerRef, priority: impl Into<i32>) -> Result<()> {
    default_manager().listen_with_priority(name, listener, priority)
}

/// Publish an event by name on the default manager
pub async fn publish(name: &str, data: EventData) -> Result<Event> {
    default_manager().publish(name, data).await
}
