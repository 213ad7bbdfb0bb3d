use dashmap::DashMap;
use snafu::OptionExt as _;

use super::{CounterStore, NotFoundSnafu, Result};
use crate::model::{Counter, Event, EventId};

/// An in-process [CounterStore]. Each increment holds the shard lock of its event while it adds the delta.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: DashMap<EventId, Event>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace an event.
    pub fn insert(&self, id: EventId, event: Event) {
        self.events.insert(id, event);
    }

    pub fn get(&self, id: &EventId) -> Option<Event> {
        self.events.get(id).map(|event| event.clone())
    }
}

impl CounterStore for MemoryStore {
    async fn increment(&self, event: &EventId, counter: Counter, delta: i64) -> Result<()> {
        let mut entry = self
            .events
            .get_mut(event)
            .context(NotFoundSnafu { event: event.clone() })?;

        *entry.get_mut(counter) += delta;
        Ok(())
    }
}
