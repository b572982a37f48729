//! Core event types.
//!
//! An [`Event`] is a named bag of JSON values with an abort flag. Publishers
//! own it; listeners get a mutable borrow for the duration of a dispatch and
//! may change its data or abort the remaining listener chain.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub mod name;

pub use name::WILDCARD;

/// Key/value payload carried by an event.
pub type EventData = HashMap<String, Value>;

/// A named, mutable event passed through every listener of a publish.
///
/// # Example
///
/// ```rust
/// use event_manager::Event;
///
/// let mut event = Event::new("user.created", Default::default());
/// event.set("id", 42);
/// event.add("id", 7); // already present, ignored
///
/// assert_eq!(event.get("id"), Some(&42.into()));
/// assert!(!event.is_aborted());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    name: String,
    #[serde(default)]
    data: EventData,
    #[serde(skip)]
    aborted: bool,
}

impl Event {
    /// Create a new event with initial data
    pub fn new(name: impl Into<String>, data: EventData) -> Self {
        Self {
            name: name.into(),
            data,
            aborted: false,
        }
    }

    /// Create a new event without data
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, EventData::new())
    }

    /// The event name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the event
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Set a value, replacing any previous one
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// Set a value only if the key is not present yet
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.entry(key.into()).or_insert_with(|| value.into());
    }

    /// All event data
    pub fn data(&self) -> &EventData {
        &self.data
    }

    /// Mutable access to the event data
    pub fn data_mut(&mut self) -> &mut EventData {
        &mut self.data
    }

    /// Replace the whole data map
    pub fn set_data(&mut self, data: EventData) -> &mut Self {
        self.data = data;
        self
    }

    /// Merge `data` into the event; supplied keys overwrite existing ones
    pub fn merge_data(&mut self, data: EventData) -> &mut Self {
        self.data.extend(data);
        self
    }

    /// Set or clear the abort flag. An aborted event stops the dispatch
    /// after the current listener returns.
    pub fn abort(&mut self, abort: bool) {
        self.aborted = abort;
    }

    /// Whether a listener aborted the dispatch
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Serialize this event to JSON
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize an event from JSON
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Conventional priority levels.
///
/// Listeners with a higher priority run first. Any `i32` is accepted at
/// registration; these levels are only the usual landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    /// Runs last
    Min,
    /// Low priority
    Low,
    /// Below normal priority
    BelowNormal,
    /// Default for listeners registered without an explicit priority
    #[default]
    Normal,
    /// Above normal priority
    AboveNormal,
    /// High priority
    High,
    /// Runs first
    Max,
}

impl Priority {
    /// The numeric priority value
    pub const fn value(self) -> i32 {
        match self {
            Priority::Min => -300,
            Priority::Low => -200,
            Priority::BelowNormal => -100,
            Priority::Normal => 0,
            Priority::AboveNormal => 100,
            Priority::High => 200,
            Priority::Max => 300,
        }
    }
}

impl From<Priority> for i32 {
    fn from(priority: Priority) -> Self {
        priority.value()
    }
}
