//! Listener trait and closure adapter.

use crate::{Event, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Something that reacts to published events.
///
/// Returning an error stops the publish and hands the error back to the
/// publisher. Calling [`Event::abort`] stops it without an error.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use event_manager::{Event, Listener, Result};
///
/// struct AuditLog;
///
/// #[async_trait]
/// impl Listener for AuditLog {
///     async fn handle(&self, event: &mut Event) -> Result<()> {
///         event.set("audited", true);
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "audit-log"
///     }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Handle an event
    async fn handle(&self, event: &mut Event) -> Result<()>;

    /// Get the listener name for debugging
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// A shared listener handle.
///
/// Registration keeps a clone of the handle; removal compares handles by
/// identity, so two separately created listeners with the same behavior
/// are still distinct.
pub type ListenerRef = Arc<dyn Listener>;

/// Whether two handles point at the same listener instance.
pub fn same_listener(a: &ListenerRef, b: &ListenerRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// A listener backed by a synchronous closure.
pub struct FunctionListener<F>
where
    F: Fn(&mut Event) -> Result<()> + Send + Sync + 'static,
{
    function: F,
    name: String,
}

impl<F> FunctionListener<F>
where
    F: Fn(&mut Event) -> Result<()> + Send + Sync + 'static,
{
    /// Create a new function listener
    pub fn new(function: F) -> Self {
        Self::with_name(function, "FunctionListener")
    }

    /// Create a new function listener with a custom name
    pub fn with_name(function: F, name: impl Into<String>) -> Self {
        Self {
            function,
            name: name.into(),
        }
    }
}

#[async_trait]
impl<F> Listener for FunctionListener<F>
where
    F: Fn(&mut Event) -> Result<()> + Send + Sync + 'static,
{
    async fn handle(&self, event: &mut Event) -> Result<()> {
        (self.function)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FunctionListener<F>
where
    F: Fn(&mut Event) -> Result<()> + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionListener")
            .field("name", &self.name)
            .finish()
    }
}

/// Wrap a closure into a shareable [`ListenerRef`].
pub fn listener_fn<F>(function: F) -> ListenerRef
where
    F: Fn(&mut Event) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(FunctionListener::new(function))
}

/// Wrap a closure into a named [`ListenerRef`].
pub fn named_listener_fn<F>(name: impl Into<String>, function: F) -> ListenerRef
where
    F: Fn(&mut Event) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(FunctionListener::with_name(function, name))
}
