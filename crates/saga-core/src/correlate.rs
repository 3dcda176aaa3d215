//! Pairing of asynchronous tool-call starts with their later ends.
//!
//! At most one in-flight entry per tool name. Registration overwrites
//! a prior entry for the same name (last-started wins); resolution
//! removes the entry. An end with no entry is a benign race, handled
//! by the caller as a no-op.

use std::collections::HashMap;

use crate::record::RecordKey;

#[derive(Debug, Default)]
pub struct Correlator {
    running: HashMap<String, RecordKey>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the running record for a tool name. Returns the key of
    /// a previously registered same-name call, if one was displaced.
    pub fn register(&mut self, tool_name: &str, key: RecordKey) -> Option<RecordKey> {
        self.running.insert(tool_name.to_string(), key)
    }

    /// Take the running record key for a tool name, removing the entry.
    pub fn resolve(&mut self, tool_name: &str) -> Option<RecordKey> {
        self.running.remove(tool_name)
    }

    pub fn peek(&self, tool_name: &str) -> Option<&RecordKey> {
        self.running.get(tool_name)
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    pub fn clear(&mut self) {
        self.running.clear();
    }
}
