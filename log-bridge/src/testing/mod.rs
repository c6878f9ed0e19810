//! In-memory stand-ins for both loggers.
//!
//! [`LoggerTree`] mimics an application logger tree (levels, propagation,
//! ancestor filters) so the adapters can be driven end to end. The other
//! fixtures store what they receive behind an `Arc<Mutex<_>>`, so a clone
//! handed to the code under test shares storage with the one the test reads
//! from.
//!
//! Enable the `testing` feature to use them outside this crate's unit tests.
use std::sync::{Arc, Mutex};

use crate::error::{BridgeError, BridgeResult};
use crate::fields::Fields;
use crate::hierarchy::{Filter, Handler, Level, LoggerHierarchy, Record};
use crate::platform::{LegacyLogFunc, LevelFlags, LogWriter, WriterOutput};

mod tree;

pub use tree::{Logger, LoggerTree};

fn snapshot<T: Clone>(storage: &Mutex<Vec<T>>, what: &str) -> BridgeResult<Vec<T>> {
    storage
        .lock()
        .map(|guard| guard.clone())
        .map_err(|e| BridgeError::InternalFailure(format!("Failed to lock {}: {}", what, e)))
}

fn clear<T>(storage: &Mutex<Vec<T>>) {
    let _ = storage.lock().map(|mut guard| guard.clear());
}

/// A record received by an [`InMemoryWriter`].
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenRecord {
    /// The level word.
    pub flags: LevelFlags,
    /// The fields.
    pub fields: Fields,
}

/// A platform writer that stores every record.
#[derive(Debug, Clone)]
pub struct InMemoryWriter {
    records: Arc<Mutex<Vec<WrittenRecord>>>,
    output: WriterOutput,
}

impl Default for InMemoryWriter {
    fn default() -> Self {
        InMemoryWriter {
            records: Arc::new(Mutex::new(Vec::new())),
            output: WriterOutput::Handled,
        }
    }
}

impl InMemoryWriter {
    /// Makes [`LogWriter::write`] report `output` instead of
    /// [`WriterOutput::Handled`].
    pub fn with_output(mut self, output: WriterOutput) -> Self {
        self.output = output;
        self
    }

    /// Returns the records written so far.
    pub fn get_emitted_records(&self) -> BridgeResult<Vec<WrittenRecord>> {
        snapshot(&self.records, "written records")
    }

    /// Clears the stored records.
    pub fn reset(&self) {
        clear(&self.records)
    }
}

impl LogWriter for InMemoryWriter {
    fn write(&self, flags: LevelFlags, fields: &Fields) -> WriterOutput {
        if let Ok(mut records) = self.records.lock() {
            records.push(WrittenRecord {
                flags,
                fields: fields.clone(),
            });
        }
        self.output
    }
}

/// A call received by an [`InMemoryLogFunc`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyCall {
    /// The domain.
    pub domain: Option<String>,
    /// The level word.
    pub flags: LevelFlags,
    /// The message.
    pub message: String,
}

/// A legacy log function that stores every call.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLogFunc {
    calls: Arc<Mutex<Vec<LegacyCall>>>,
}

impl InMemoryLogFunc {
    /// Returns the calls received so far.
    pub fn get_emitted_calls(&self) -> BridgeResult<Vec<LegacyCall>> {
        snapshot(&self.calls, "legacy calls")
    }

    /// Clears the stored calls.
    pub fn reset(&self) {
        clear(&self.calls)
    }
}

impl LegacyLogFunc for InMemoryLogFunc {
    fn log(&self, domain: Option<&str>, flags: LevelFlags, message: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(LegacyCall {
                domain: domain.map(str::to_owned),
                flags,
                message: message.to_owned(),
            });
        }
    }
}

/// A hierarchy handler that stores every record.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHandler {
    records: Arc<Mutex<Vec<Record>>>,
}

impl InMemoryHandler {
    /// Returns the records handled so far.
    pub fn get_emitted_records(&self) -> BridgeResult<Vec<Record>> {
        snapshot(&self.records, "handled records")
    }

    /// Clears the stored records.
    pub fn reset(&self) {
        clear(&self.records)
    }
}

impl Handler for InMemoryHandler {
    fn handle(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

#[derive(Default)]
struct HierarchyState {
    records: Vec<Record>,
    levels: Vec<(String, Level)>,
    filters: Vec<(String, Arc<dyn Filter>)>,
}

/// A flat hierarchy that stores what it is told.
///
/// Records pass through every installed filter regardless of logger name,
/// then are stored. Levels are recorded but not applied.
#[derive(Clone, Default)]
pub struct InMemoryHierarchy {
    state: Arc<Mutex<HierarchyState>>,
}

impl std::fmt::Debug for InMemoryHierarchy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("InMemoryHierarchy")
    }
}

impl InMemoryHierarchy {
    /// Returns the records that passed the filters.
    pub fn get_emitted_records(&self) -> BridgeResult<Vec<Record>> {
        self.state
            .lock()
            .map(|state| state.records.clone())
            .map_err(|e| BridgeError::InternalFailure(format!("Failed to lock records: {}", e)))
    }

    /// Returns every `set_level` call, in order.
    pub fn get_levels(&self) -> BridgeResult<Vec<(String, Level)>> {
        self.state
            .lock()
            .map(|state| state.levels.clone())
            .map_err(|e| BridgeError::InternalFailure(format!("Failed to lock levels: {}", e)))
    }

    /// Returns the names of the loggers filters were installed on.
    pub fn get_filter_targets(&self) -> BridgeResult<Vec<String>> {
        self.state
            .lock()
            .map(|state| state.filters.iter().map(|(name, _)| name.clone()).collect())
            .map_err(|e| BridgeError::InternalFailure(format!("Failed to lock filters: {}", e)))
    }

    /// Clears records, levels and filters.
    pub fn reset(&self) {
        if let Ok(mut state) = self.state.lock() {
            *state = HierarchyState::default();
        }
    }
}

impl LoggerHierarchy for InMemoryHierarchy {
    fn handle(&self, record: Record) {
        let filters: Vec<Arc<dyn Filter>> = match self.state.lock() {
            Ok(state) => state.filters.iter().map(|(_, f)| f.clone()).collect(),
            Err(_) => return,
        };
        if filters.iter().all(|filter| filter.filter(&record)) {
            if let Ok(mut state) = self.state.lock() {
                state.records.push(record);
            }
        }
    }

    fn set_level(&self, name: &str, level: Level) {
        if let Ok(mut state) = self.state.lock() {
            state.levels.push((name.to_owned(), level));
        }
    }

    fn add_filter(&self, name: &str, filter: Arc<dyn Filter>) {
        if let Ok(mut state) = self.state.lock() {
            state.filters.push((name.to_owned(), filter));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_stores_and_resets() {
        let writer = InMemoryWriter::default().with_output(WriterOutput::Unhandled);
        let shared = writer.clone();
        assert_eq!(
            shared.write(LevelFlags::LEVEL_INFO, &Fields::new()),
            WriterOutput::Unhandled
        );
        assert_eq!(writer.get_emitted_records().unwrap().len(), 1);
        writer.reset();
        assert!(writer.get_emitted_records().unwrap().is_empty());
    }

    #[test]
    fn hierarchy_applies_filters() {
        let hierarchy = InMemoryHierarchy::default();
        hierarchy.add_filter("net", Arc::new(|r: &Record| r.level >= Level::INFO));
        hierarchy.handle(Record::new("any", Level::DEBUG, "dropped"));
        hierarchy.handle(Record::new("any", Level::INFO, "kept"));
        hierarchy.set_level("net", Level::DEBUG);

        let records = hierarchy.get_emitted_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "kept");
        assert_eq!(
            hierarchy.get_levels().unwrap(),
            vec![("net".to_string(), Level::DEBUG)]
        );
        assert_eq!(hierarchy.get_filter_targets().unwrap(), vec!["net"]);

        hierarchy.reset();
        assert!(hierarchy.get_emitted_records().unwrap().is_empty());
    }
}
