use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::fields::Fields;
use crate::hierarchy::{parent_name, Filter, Handler, Level, LoggerHierarchy, Record, ROOT_LOGGER};

struct LoggerNode {
    level: Level,
    propagate: bool,
    handlers: Vec<Arc<dyn Handler>>,
    filters: Vec<Arc<dyn Filter>>,
}

impl LoggerNode {
    fn new(level: Level) -> Self {
        LoggerNode {
            level,
            propagate: true,
            handlers: Vec::new(),
            filters: Vec::new(),
        }
    }
}

/// A minimal tree of named loggers for exercising the adapters end to end.
///
/// Loggers spring into existence the first time they are configured. The root
/// starts at `WARNING`, every other logger at `NOTSET` and therefore inherits
/// the level of its closest configured ancestor.
///
/// Handlers and filters are called without holding the tree lock, so they may
/// log through the tree themselves.
pub struct LoggerTree {
    loggers: RwLock<HashMap<String, LoggerNode>>,
}

impl Default for LoggerTree {
    fn default() -> Self {
        LoggerTree::new()
    }
}

impl fmt::Debug for LoggerTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loggers = self.read();
        let mut names: Vec<_> = loggers.keys().collect();
        names.sort();
        f.debug_struct("LoggerTree").field("loggers", &names).finish()
    }
}

impl LoggerTree {
    /// Creates a tree holding only the root logger.
    pub fn new() -> Self {
        let mut loggers = HashMap::new();
        loggers.insert(ROOT_LOGGER.to_owned(), LoggerNode::new(Level::WARNING));
        LoggerTree {
            loggers: RwLock::new(loggers),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, LoggerNode>> {
        self.loggers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, LoggerNode>> {
        self.loggers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_node<R>(&self, name: &str, f: impl FnOnce(&mut LoggerNode) -> R) -> R {
        let mut loggers = self.write();
        let node = loggers
            .entry(name.to_owned())
            .or_insert_with(|| LoggerNode::new(Level::NOTSET));
        f(node)
    }

    /// The level set on `name` itself.
    pub fn level(&self, name: &str) -> Level {
        self.read()
            .get(name)
            .map_or(Level::NOTSET, |node| node.level)
    }

    /// The level that gates records of `name`: its own, or that of the
    /// closest ancestor with one set.
    pub fn effective_level(&self, name: &str) -> Level {
        let loggers = self.read();
        ancestors(name)
            .filter_map(|n| loggers.get(n))
            .map(|node| node.level)
            .find(|level| *level != Level::NOTSET)
            .unwrap_or(Level::NOTSET)
    }

    /// Whether a record of `level` on `name` would be emitted.
    pub fn is_enabled_for(&self, name: &str, level: Level) -> bool {
        level >= self.effective_level(name)
    }

    /// Adds a handler to `name`.
    pub fn add_handler(&self, name: &str, handler: Arc<dyn Handler>) {
        self.with_node(name, |node| node.handlers.push(handler));
    }

    /// Number of filters installed on `name` itself.
    pub fn filter_count(&self, name: &str) -> usize {
        self.read().get(name).map_or(0, |node| node.filters.len())
    }

    /// Whether records of `name` continue to the handlers of its ancestors.
    pub fn set_propagate(&self, name: &str, propagate: bool) {
        self.with_node(name, |node| node.propagate = propagate);
    }

    /// A handle for emitting records on `name`.
    pub fn logger(&self, name: impl Into<String>) -> Logger<'_> {
        Logger {
            tree: self,
            name: name.into(),
        }
    }
}

impl LoggerHierarchy for LoggerTree {
    fn handle(&self, record: Record) {
        let (filters, handlers) = {
            let loggers = self.read();
            let mut filters: Vec<Arc<dyn Filter>> = Vec::new();
            let mut handlers: Vec<Arc<dyn Handler>> = Vec::new();
            let mut propagating = true;
            for name in ancestors(&record.name) {
                let Some(node) = loggers.get(name) else {
                    continue;
                };
                filters.extend(node.filters.iter().cloned());
                if propagating {
                    handlers.extend(node.handlers.iter().cloned());
                    propagating = node.propagate;
                }
            }
            (filters, handlers)
        };

        if filters.iter().any(|filter| !filter.filter(&record)) {
            return;
        }
        for handler in &handlers {
            handler.handle(&record);
        }
    }

    fn set_level(&self, name: &str, level: Level) {
        self.with_node(name, |node| node.level = level);
    }

    fn add_filter(&self, name: &str, filter: Arc<dyn Filter>) {
        self.with_node(name, |node| node.filters.push(filter));
    }
}

/// `name` followed by each of its ancestors, ending with the root.
fn ancestors(name: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(name), |n| parent_name(*n))
}

/// A named logger inside a [`LoggerTree`].
#[derive(Debug, Clone)]
pub struct Logger<'a> {
    tree: &'a LoggerTree,
    name: String,
}

impl Logger<'_> {
    /// The logger's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Emits `message` at `level` if the logger is enabled for it.
    pub fn log(&self, level: Level, message: impl Into<String>) {
        if self.tree.is_enabled_for(&self.name, level) {
            self.tree
                .handle(Record::new(self.name.clone(), level, message));
        }
    }

    /// Emits `message` with structured `extras`.
    pub fn log_with_extras(&self, level: Level, message: impl Into<String>, extras: Fields) {
        if self.tree.is_enabled_for(&self.name, level) {
            self.tree
                .handle(Record::new(self.name.clone(), level, message).with_extras(extras));
        }
    }

    /// Emits at `DEBUG`.
    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::DEBUG, message)
    }

    /// Emits at `INFO`.
    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::INFO, message)
    }

    /// Emits at `WARNING`.
    pub fn warning(&self, message: impl Into<String>) {
        self.log(Level::WARNING, message)
    }

    /// Emits at `ERROR`.
    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::ERROR, message)
    }

    /// Emits at `CRITICAL`.
    pub fn critical(&self, message: impl Into<String>) {
        self.log(Level::CRITICAL, message)
    }
}
