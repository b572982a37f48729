//! The main EventManager implementation.
//!
//! The EventManager is the primary interface for registering listeners and
//! publishing events. It ties a [`Registry`] to a [`Dispatcher`] and adds
//! the concurrent publish forms on top of the dispatch algorithm.

use crate::dispatcher::{Dispatcher, DispatcherStats};
use crate::listener::{ListenerItem, ListenerQueue, ListenerRef, Subscriber};
use crate::registry::Registry;
use crate::{Error, Event, EventData, Priority, Result};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub mod builder;
pub mod config;

pub use builder::EventManagerBuilder;
pub use config::ManagerConfig;

/// An item of [`EventManager::publish_batch`].
#[derive(Debug, Clone)]
pub enum BatchItem {
    /// Publish this name without extra data
    Name(String),

    /// Dispatch this pre-built event
    Event(Event),
}

impl From<&str> for BatchItem {
    fn from(name: &str) -> Self {
        BatchItem::Name(name.to_string())
    }
}

impl From<String> for BatchItem {
    fn from(name: String) -> Self {
        BatchItem::Name(name)
    }
}

impl From<Event> for BatchItem {
    fn from(event: Event) -> Self {
        BatchItem::Event(event)
    }
}

/// Registers listeners and publishes events to them.
///
/// Cloning is cheap and every clone shares the same listeners.
///
/// # Example
///
/// ```rust
/// use event_manager::{listener_fn, Event, EventData, EventManager, Priority};
///
/// # #[tokio::main]
/// # async fn main() -> event_manager::Result<()> {
/// let manager = EventManager::new("app");
///
/// manager.listen_with_priority(
///     "user.created",
///     listener_fn(|e: &mut Event| {
///         e.set("welcomed", true);
///         Ok(())
///     }),
///     Priority::High,
/// )?;
/// manager.listen("user.*", listener_fn(|_: &mut Event| Ok(())))?;
///
/// let event = manager.publish("user.created", EventData::new()).await?;
/// assert_eq!(event.get("welcomed"), Some(&true.into()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EventManager {
    registry: Arc<Registry>,
    dispatcher: Arc<Dispatcher>,
}

impl EventManager {
    /// Create a new EventManager builder
    pub fn builder() -> EventManagerBuilder {
        EventManagerBuilder::new()
    }

    /// Create a manager with default configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(ManagerConfig::new().name(name))
    }

    /// Create a manager from a configuration
    pub fn with_config(config: ManagerConfig) -> Self {
        let registry = Arc::new(Registry::new(config.name));
        let dispatcher = Arc::new(Dispatcher::new(registry.clone(), config.dispatcher));
        Self {
            registry,
            dispatcher,
        }
    }

    /// The manager name
    pub fn name(&self) -> String {
        self.registry.name()
    }

    /// The underlying registry
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Register a listener at [`Priority::Normal`].
    ///
    /// `name` is an event name, a group pattern such as `app.*`, or `*`.
    pub fn listen(&self, name: &str, listener: ListenerRef) -> Result<()> {
        self.listen_with_priority(name, listener, Priority::Normal)
    }

    /// Register a listener with a priority. Higher priorities run first.
    pub fn listen_with_priority(
        &self,
        name: &str,
        listener: ListenerRef,
        priority: impl Into<i32>,
    ) -> Result<()> {
        self.registry
            .add_listener(name, ListenerItem::new(priority, listener))
    }

    /// Register every listener a subscriber declares
    pub fn subscribe(&self, subscriber: &dyn Subscriber) -> Result<()> {
        self.registry.subscribe(subscriber)
    }

    /// Publish an event by name and run its listeners on the current task.
    ///
    /// Returns the event after dispatch, or the first listener error.
    /// Publishing a name nobody listens to is not an error.
    pub async fn publish(&self, name: &str, data: EventData) -> Result<Event> {
        self.dispatcher.publish(name, data).await
    }

    /// Like [`publish`](Self::publish), but panics on any error.
    pub async fn must_publish(&self, name: &str, data: EventData) -> Event {
        match self.publish(name, data).await {
            Ok(event) => event,
            Err(e) => panic!("event: publish of '{name}' failed: {e}"),
        }
    }

    /// Dispatch an event on a new task and return immediately.
    ///
    /// Listener errors are logged and dropped. Awaiting the handle yields
    /// the event after dispatch; dropping it detaches the task. Must be
    /// called within a Tokio runtime.
    pub fn publish_async(&self, event: Event) -> JoinHandle<Event> {
        let dispatcher = self.dispatcher.clone();

        tokio::spawn(async move {
            let mut event = event;
            if let Err(e) = dispatcher.dispatch(&mut event).await {
                warn!(event = event.name(), error = %e, "Async publish failed");
            }
            event
        })
    }

    /// Dispatch an event on a new task and wait for it to finish.
    pub async fn publish_await(&self, event: Event) -> Result<Event> {
        let dispatcher = self.dispatcher.clone();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut event = event;
            let result = dispatcher.dispatch(&mut event).await.map(|()| event);
            let _ = tx.send(result);
        });

        rx.await.map_err(|_| Error::ChannelReceiveError)?
    }

    /// Publish several names or events in order.
    ///
    /// A failing item does not stop the batch; its error is collected.
    pub async fn publish_batch<I>(&self, items: I) -> Vec<Error>
    where
        I: IntoIterator,
        I::Item: Into<BatchItem>,
    {
        let items: Vec<BatchItem> = items.into_iter().map(Into::into).collect();
        let mut errors = Vec::new();

        for item in items {
            let result = match item {
                BatchItem::Name(name) => self.publish(&name, EventData::new()).await.map(drop),
                BatchItem::Event(mut event) => self.dispatcher.dispatch(&mut event).await,
            };

            if let Err(e) = result {
                debug!(error = %e, "Batch item failed");
                errors.push(e);
            }
        }

        errors
    }

    /// Whether listeners are registered under this exact name or pattern
    pub fn has_listeners(&self, name: &str) -> bool {
        self.registry.has_listeners(name)
    }

    /// Number of listeners under this exact name or pattern
    pub fn listener_count(&self, name: &str) -> usize {
        self.registry.listener_count(name)
    }

    /// All listened names and patterns, sorted
    pub fn listened_names(&self) -> Vec<String> {
        self.registry.listened_names()
    }

    /// A priority-sorted copy of the listeners under this exact name
    pub fn listeners_for(&self, name: &str) -> Option<ListenerQueue> {
        self.registry.listeners_for(name)
    }

    /// Remove a listener from one name, or from every name with `None` or `Some("")`
    pub fn remove_listener(&self, name: Option<&str>, listener: &ListenerRef) {
        self.registry.remove_listener(name, listener)
    }

    /// Remove all listeners under this exact name or pattern
    pub fn remove_listeners(&self, name: &str) {
        self.registry.remove_listeners(name)
    }

    /// Pre-register an event; publishes of its name start from a copy of it.
    ///
    /// Each publish works on its own clone: data passed to `publish` and
    /// changes made by listeners land on the returned event and never reach
    /// the stored prototype.
    pub fn add_event(&self, event: Event) -> Result<()> {
        self.registry.add_event(event)
    }

    /// A copy of the pre-registered event under this name
    pub fn get_event(&self, name: &str) -> Option<Event> {
        self.registry.get_event(name)
    }

    /// Whether an event is pre-registered under this name
    pub fn has_event(&self, name: &str) -> bool {
        self.registry.has_event(name)
    }

    /// Remove the pre-registered event under this name
    pub fn remove_event(&self, name: &str) -> Option<Event> {
        self.registry.remove_event(name)
    }

    /// Remove all pre-registered events
    pub fn remove_events(&self) {
        self.registry.remove_events()
    }

    /// Turn the publish lock on or off
    pub fn set_lock_enabled(&self, enable: bool) {
        self.dispatcher.set_lock_enabled(enable)
    }

    /// Whether publishes are serialized
    pub fn lock_enabled(&self) -> bool {
        self.dispatcher.lock_enabled()
    }

    /// Get dispatch statistics
    pub fn stats(&self) -> DispatcherStats {
        self.dispatcher.stats()
    }

    /// Drop every listener and pre-registered event. The manager stays
    /// usable.
    pub fn reset(&self) {
        info!(name = %self.registry.name(), "Resetting EventManager");
        self.registry.reset();
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::with_config(ManagerConfig::default())
    }
}
