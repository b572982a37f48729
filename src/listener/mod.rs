//! Listeners and their registration shapes.
//!
//! A listener is registered under a name together with a priority. The
//! pair is stored as a [`ListenerItem`] in the [`ListenerQueue`] for that
//! name. A [`Subscriber`] registers several listeners at once.

use crate::event::Priority;
use std::collections::HashMap;
use std::fmt;

pub mod handler;
pub mod queue;

pub use handler::{listener_fn, named_listener_fn, same_listener, FunctionListener, Listener, ListenerRef};
pub use queue::ListenerQueue;

/// A listener together with its priority.
#[derive(Clone)]
pub struct ListenerItem {
    /// Larger values run earlier
    pub priority: i32,

    /// The listener itself
    pub listener: ListenerRef,
}

impl ListenerItem {
    /// Create a new listener item
    pub fn new(priority: impl Into<i32>, listener: ListenerRef) -> Self {
        Self {
            priority: priority.into(),
            listener,
        }
    }
}

impl fmt::Debug for ListenerItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerItem")
            .field("priority", &self.priority)
            .field("listener", &self.listener.name())
            .finish()
    }
}

/// One entry of a [`Subscriber`] mapping.
#[derive(Clone)]
pub enum Subscription {
    /// A listener registered at [`Priority::Normal`]
    Listener(ListenerRef),

    /// A listener registered at an explicit priority
    Prioritized(ListenerItem),
}

impl Subscription {
    /// Build a prioritized subscription
    pub fn prioritized(priority: impl Into<i32>, listener: ListenerRef) -> Self {
        Subscription::Prioritized(ListenerItem::new(priority, listener))
    }

    /// Turn this subscription into the item that gets queued
    pub fn into_item(self) -> ListenerItem {
        match self {
            Subscription::Listener(listener) => ListenerItem::new(Priority::Normal, listener),
            Subscription::Prioritized(item) => item,
        }
    }
}

impl From<ListenerRef> for Subscription {
    fn from(listener: ListenerRef) -> Self {
        Subscription::Listener(listener)
    }
}

impl From<ListenerItem> for Subscription {
    fn from(item: ListenerItem) -> Self {
        Subscription::Prioritized(item)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subscription::Listener(listener) => {
                f.debug_tuple("Listener").field(&listener.name()).finish()
            }
            Subscription::Prioritized(item) => f.debug_tuple("Prioritized").field(item).finish(),
        }
    }
}

/// Registers several listeners at once.
///
/// # Example
///
/// ```rust
/// use event_manager::{listener_fn, Event, Priority, Subscriber, Subscription};
/// use std::collections::HashMap;
///
/// struct Billing;
///
/// impl Subscriber for Billing {
///     fn subscribed_events(&self) -> HashMap<String, Subscription> {
///         HashMap::from([
///             ("order.paid".to_string(), listener_fn(|_: &mut Event| Ok(())).into()),
///             (
///                 "order.*".to_string(),
///                 Subscription::prioritized(Priority::High, listener_fn(|_: &mut Event| Ok(()))),
///             ),
///         ])
///     }
/// }
/// ```
pub trait Subscriber {
    /// Event name or pattern mapped to the listener to register under it
    fn subscribed_events(&self) -> HashMap<String, Subscription>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Event;

    #[test]
    fn test_subscription_into_item() {
        let listener = listener_fn(|_: &mut Event| Ok(()));

        let item = Subscription::from(listener.clone()).into_item();
        assert_eq!(item.priority, 0);
        assert!(same_listener(&item.listener, &listener));

        let item = Subscription::prioritized(Priority::AboveNormal, listener.clone()).into_item();
        assert_eq!(item.priority, 100);

        let item = Subscription::from(ListenerItem::new(-5, listener)).into_item();
        assert_eq!(item.priority, -5);
    }

    #[test]
    fn test_listener_item_debug() {
        let item = ListenerItem::new(Priority::High, named_listener_fn("audit", |_: &mut Event| Ok(())));
        let debug = format!("{:?}", item);
        assert!(debug.contains("200"));
        assert!(debug.contains("audit"));
    }
}
