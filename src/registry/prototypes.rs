//! Pre-registered event prototypes.

use crate::event::name::check_name;
use crate::{Event, EventData, Result};
use dashmap::DashMap;

/// Event templates keyed by event name.
///
/// Publishing a name with a prototype dispatches a clone of it with the
/// supplied data merged in. Other names get a clone of the blank `sample`.
#[derive(Debug, Default)]
pub(crate) struct Prototypes {
    events: DashMap<String, Event>,
    sample: Event,
}

impl Prototypes {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Store a prototype under its (validated) name, replacing any previous one
    pub(crate) fn add(&self, event: Event) -> Result<()> {
        let name = check_name(event.name())?.to_string();
        self.events.insert(name, event);
        Ok(())
    }

    pub(crate) fn get(&self, name: &str) -> Option<Event> {
        self.events.get(name).map(|e| e.clone())
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.events.contains_key(name)
    }

    pub(crate) fn remove(&self, name: &str) -> Option<Event> {
        self.events.remove(name).map(|(_, e)| e)
    }

    pub(crate) fn clear(&self) {
        self.events.clear();
    }

    /// The event a publish of `name` runs with
    pub(crate) fn instantiate(&self, name: &str, data: EventData) -> Event {
        match self.get(name) {
            Some(mut event) => {
                event.merge_data(data);
                event
            }
            None => {
                let mut event = self.sample.clone();
                event.set_name(name).set_data(data);
                event
            }
        }
    }
}
