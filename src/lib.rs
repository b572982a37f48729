//! # event-manager
//!
//! An in-process event manager for Tokio applications.
//!
//! ## Features
//!
//! - **Named events** carrying a JSON key/value payload
//! - **Priorities**: higher priority listeners run first
//! - **Wildcards**: `app.user.*` group listeners and `*` global listeners
//! - **Short-circuiting**: a listener error or abort stops the dispatch
//! - **Thread-safe** registration while publishes are in flight
//! - Inline, fire-and-forget, awaited and batch publishing
//!
//! ## Quick Example
//!
//! ```rust
//! use event_manager::{listener_fn, Event, EventData, EventManager, Priority};
//!
//! #[tokio::main]
//! async fn main() -> event_manager::Result<()> {
//!     let manager = EventManager::builder().name("app").build();
//!
//!     manager.listen_with_priority(
//!         "order.created",
//!         listener_fn(|event: &mut Event| {
//!             event.set("validated", true);
//!             Ok(())
//!         }),
//!         Priority::High,
//!     )?;
//!
//!     // sees every "order.<something>" event, after the exact listeners
//!     manager.listen("order.*", listener_fn(|event: &mut Event| {
//!         assert_eq!(event.get("validated"), Some(&true.into()));
//!         Ok(())
//!     }))?;
//!
//!     let event = manager.publish("order.created", EventData::new()).await?;
//!     assert_eq!(event.name(), "order.created");
//!     Ok(())
//! }
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    unreachable_pub
)]

/// Core event types
pub mod event;

/// Error types and result aliases
pub mod error;

/// Listener traits, items and queues
pub mod listener;

/// Listener and prototype storage
pub mod registry;

/// The publish algorithm
pub mod dispatcher;

/// The main event manager
pub mod manager;

/// Process-wide default manager
pub mod global;

// Re-export commonly used types
pub use dispatcher::{Dispatcher, DispatcherConfig, DispatcherStats};
pub use error::{Error, Result};
pub use event::{Event, EventData, Priority, WILDCARD};
pub use global::default_manager;
pub use listener::{
    listener_fn, named_listener_fn, FunctionListener, Listener, ListenerItem, ListenerQueue,
    ListenerRef, Subscriber, Subscription,
};
pub use manager::{BatchItem, EventManager, EventManagerBuilder, ManagerConfig};
pub use registry::Registry;

/// Prelude module for convenient imports
///
/// # Example
/// ```rust
/// use event_manager::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::event::{Event, EventData, Priority};
    pub use crate::listener::{listener_fn, Listener, ListenerRef, Subscriber, Subscription};
    pub use crate::manager::{EventManager, EventManagerBuilder};
}
