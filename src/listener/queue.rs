//! Priority-ordered listener storage for a single event name.

use super::{same_listener, ListenerItem, ListenerRef};

/// Listeners registered under one name.
///
/// Items are appended as they are registered and sorted lazily by
/// [`ListenerQueue::sort`] right before a dispatch. The sort is stable, so
/// listeners with equal priority keep their registration order.
#[derive(Debug, Clone, Default)]
pub struct ListenerQueue {
    items: Vec<ListenerItem>,
}

impl ListenerQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued listeners
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue holds no listener
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item. Duplicates are allowed.
    pub fn push(&mut self, item: ListenerItem) -> &mut Self {
        self.items.push(item);
        self
    }

    /// Order items by descending priority.
    pub fn sort(&mut self) -> &mut Self {
        if !self.items.is_sorted_by(|a, b| a.priority >= b.priority) {
            self.items.sort_by(|a, b| b.priority.cmp(&a.priority));
        }
        self
    }

    /// All items in their current order
    pub fn items(&self) -> &[ListenerItem] {
        &self.items
    }

    /// Remove every item holding this exact listener instance.
    pub fn remove(&mut self, listener: &ListenerRef) {
        self.items.retain(|item| !same_listener(&item.listener, listener));
    }

    /// Drop all items, keeping the allocation.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
