//! Append-only store of raw events — source of truth for replay.

use crate::event::RawEvent;

#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<RawEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event, returning its position.
    pub fn push(&mut self, event: RawEvent) -> usize {
        self.events.push(event);
        self.events.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&RawEvent> {
        self.events.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &RawEvent)> {
        self.events.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
