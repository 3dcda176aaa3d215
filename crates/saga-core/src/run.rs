//! Per-task-run reconciliation context.
//!
//! Owns the event store, view model, and correlator for exactly one
//! task run. Constructed fresh (or `reset`) before the first event of
//! a run is processed; there is no ambient state shared across runs.

use crate::cache::ViewModel;
use crate::correlate::Correlator;
use crate::event::RawEvent;
use crate::record::ProcessedEvent;
use crate::reconcile::reconcile;
use crate::store::EventStore;

#[derive(Debug, Default)]
pub struct RunContext {
    store: EventStore,
    cache: ViewModel,
    correlator: Correlator,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one delivered event: append to the store and reconcile.
    /// Keepalives are accepted and discarded before the store. Returns
    /// true when the view model changed.
    pub fn ingest(&mut self, raw: RawEvent) -> bool {
        if raw.is_keepalive() {
            return false;
        }
        let index = self.store.len();
        let changed = reconcile(&raw, index, &mut self.cache, &mut self.correlator);
        self.store.push(raw);
        changed
    }

    /// Re-derive the view model from the unchanged store. Yields a
    /// setwise-identical result to the incremental path.
    pub fn rebuild(&mut self) {
        self.cache.clear();
        self.correlator.clear();
        for (index, raw) in self.store.iter() {
            reconcile(raw, index, &mut self.cache, &mut self.correlator);
        }
    }

    /// Clear all run state — done exactly once per new task run.
    pub fn reset(&mut self) {
        self.store.clear();
        self.cache.clear();
        self.correlator.clear();
    }

    pub fn records(&self) -> &[ProcessedEvent] {
        self.cache.records()
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }
}
