//! Registry of listeners and event prototypes.
//!
//! The registry maps event names and patterns to their [`ListenerQueue`]s
//! and keeps an index of every listened name. All operations take `&self`
//! and are safe to call while publishes are in flight: each name's queue is
//! only touched under its map shard lock, and listener calls never happen
//! while a lock is held.

use crate::event::name::check_pattern;
use crate::listener::{ListenerItem, ListenerQueue, ListenerRef, Subscriber, Subscription};
use crate::{Event, EventData, Result};
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use parking_lot::RwLock;
use tracing::{debug, trace};

mod prototypes;

use prototypes::Prototypes;

/// Thread-safe storage for listeners and event prototypes.
#[derive(Debug)]
pub struct Registry {
    /// Instance name, cleared on reset
    name: RwLock<String>,

    /// Map from event name or pattern to its listeners
    listeners: DashMap<String, ListenerQueue>,

    /// Every key of `listeners`; updated under the same shard lock
    listened_names: DashSet<String>,

    /// Pre-registered events
    prototypes: Prototypes,
}

impl Registry {
    /// Create a new empty registry
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: RwLock::new(name.into()),
            listeners: DashMap::new(),
            listened_names: DashSet::new(),
            prototypes: Prototypes::new(),
        }
    }

    /// The registry name
    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    /// Register a listener under an event name, a group pattern (`app.*`)
    /// or the global wildcard (`*`).
    pub fn add_listener(&self, name: &str, item: ListenerItem) -> Result<()> {
        let name = check_pattern(name)?;

        trace!(
            event = name,
            priority = item.priority,
            listener = item.listener.name(),
            "Registering listener"
        );

        let mut queue = self.listeners.entry(name.to_string()).or_default();
        queue.push(item);
        self.listened_names.insert(name.to_string());
        let count = queue.len();
        drop(queue);

        debug!(event = name, listeners = count, "Listener registered");
        Ok(())
    }

    /// Register every listener a subscriber declares.
    ///
    /// All keys are validated first; nothing is registered if one is bad.
    pub fn subscribe(&self, subscriber: &dyn Subscriber) -> Result<()> {
        let subscriptions = subscriber
            .subscribed_events()
            .into_iter()
            .map(|(name, sub)| -> Result<(String, Subscription)> {
                Ok((check_pattern(&name)?.to_string(), sub))
            })
            .collect::<Result<Vec<_>>>()?;

        for (name, sub) in subscriptions {
            self.add_listener(&name, sub.into_item())?;
        }
        Ok(())
    }

    /// Whether listeners are registered under this exact name or pattern
    pub fn has_listeners(&self, name: &str) -> bool {
        self.listened_names.contains(name)
    }

    /// Number of listeners registered under this exact name or pattern
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map(|q| q.len()).unwrap_or(0)
    }

    /// All listened names and patterns, sorted
    pub fn listened_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listened_names.iter().map(|n| n.key().clone()).collect();
        names.sort();
        names
    }

    /// A priority-sorted copy of the queue for this exact name or pattern
    pub fn listeners_for(&self, name: &str) -> Option<ListenerQueue> {
        self.listeners.get_mut(name).map(|mut queue| {
            queue.sort();
            queue.clone()
        })
    }

    /// Sort the queue in place and snapshot its items for a dispatch pass.
    pub(crate) fn sorted_items(&self, name: &str) -> Option<Vec<ListenerItem>> {
        self.listeners.get_mut(name).map(|mut queue| {
            queue.sort();
            queue.items().to_vec()
        })
    }

    /// Remove a listener instance.
    ///
    /// With a name, only that queue is searched; with `None` or an empty
    /// name, every queue is. Queues left empty are dropped together with
    /// their listened name.
    pub fn remove_listener(&self, name: Option<&str>, listener: &ListenerRef) {
        let name = name.filter(|n| !n.is_empty());
        match name {
            Some(name) => {
                if let Entry::Occupied(mut entry) = self.listeners.entry(name.to_string()) {
                    entry.get_mut().remove(listener);
                    if entry.get().is_empty() {
                        self.listened_names.remove(name);
                        entry.remove();
                    }
                }
            }
            None => {
                self.listeners.retain(|name, queue| {
                    queue.remove(listener);
                    if queue.is_empty() {
                        self.listened_names.remove(name);
                        return false;
                    }
                    true
                });
            }
        }

        debug!(event = name.unwrap_or("<all>"), listener = listener.name(), "Listener removed");
    }

    /// Remove every listener under this exact name or pattern
    pub fn remove_listeners(&self, name: &str) {
        if let Entry::Occupied(entry) = self.listeners.entry(name.to_string()) {
            self.listened_names.remove(name);
            entry.remove().clear();
            debug!(event = name, "Listeners removed");
        }
    }

    /// Store a prototype event under its name, replacing any previous one
    pub fn add_event(&self, event: Event) -> Result<()> {
        self.prototypes.add(event)
    }

    /// A copy of the prototype stored under this name
    pub fn get_event(&self, name: &str) -> Option<Event> {
        self.prototypes.get(name)
    }

    /// Whether a prototype is stored under this name
    pub fn has_event(&self, name: &str) -> bool {
        self.prototypes.contains(name)
    }

    /// Remove the prototype stored under this name
    pub fn remove_event(&self, name: &str) -> Option<Event> {
        self.prototypes.remove(name)
    }

    /// Remove all prototypes
    pub fn remove_events(&self) {
        self.prototypes.clear();
    }

    /// The event a publish of `name` runs with: the prototype with `data`
    /// merged in, or a fresh event.
    pub(crate) fn instantiate(&self, name: &str, data: EventData) -> Event {
        self.prototypes.instantiate(name, data)
    }

    /// Drop all listeners, names and prototypes and clear the instance name.
    /// The registry stays usable.
    pub fn reset(&self) {
        self.listeners.retain(|name, queue| {
            queue.clear();
            self.listened_names.remove(name);
            false
        });
        self.prototypes.clear();
        self.name.write().clear();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new("")
    }
}
