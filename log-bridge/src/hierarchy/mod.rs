//! # Hierarchy logger interface
//!
//! The application logger is a tree of named loggers (`""` is the root,
//! `net` its child, `net.io` a grandchild). Records carry a numeric level;
//! loggers have thresholds, [`Handler`]s and [`Filter`]s.
//!
//! The bridge needs three things from it:
//!
//! - [`Handler`]: receives every record emitted through a logger or its
//!   descendants. The reverse adapters implement it.
//! - [`LoggerHierarchy::handle`]: injects a record into a named logger. The
//!   forward adapter calls it.
//! - [`LoggerHierarchy::set_level`] and [`LoggerHierarchy::add_filter`]: used
//!   by [`DebugFilter::register_for_all_namespaces`].
//!
//! The application owns the logger runtime; `testing::LoggerTree` is a small
//! stand-in used by this crate's tests.
//!
//! [`DebugFilter::register_for_all_namespaces`]: crate::debug_filter::DebugFilter::register_for_all_namespaces
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::BridgeError;
use crate::fields::Fields;

/// Name of the root logger.
pub const ROOT_LOGGER: &str = "";

/// Numeric severity. Higher is more severe; values between the named
/// constants are valid custom levels.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level(u32);

impl Level {
    /// Unset: defer to the parent logger.
    pub const NOTSET: Level = Level(0);
    /// Debugging output.
    pub const DEBUG: Level = Level(10);
    /// Informational output.
    pub const INFO: Level = Level(20);
    /// Something unexpected happened.
    pub const WARNING: Level = Level(30);
    /// An operation failed.
    pub const ERROR: Level = Level(40);
    /// The program may not be able to continue.
    pub const CRITICAL: Level = Level(50);

    /// Creates a level from its numeric value.
    pub const fn new(value: u32) -> Self {
        Level(value)
    }

    /// The numeric value.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// The name of a standard level.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("NOTSET"),
            10 => Some("DEBUG"),
            20 => Some("INFO"),
            30 => Some("WARNING"),
            40 => Some("ERROR"),
            50 => Some("CRITICAL"),
            _ => None,
        }
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Level({})", self.0),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Level {}", self.0),
        }
    }
}

impl FromStr for Level {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NOTSET" => Ok(Level::NOTSET),
            "DEBUG" => Ok(Level::DEBUG),
            "INFO" => Ok(Level::INFO),
            "WARNING" | "WARN" => Ok(Level::WARNING),
            "ERROR" => Ok(Level::ERROR),
            "CRITICAL" | "FATAL" => Ok(Level::CRITICAL),
            other => other
                .parse::<u32>()
                .map(Level)
                .map_err(|_| BridgeError::UnknownLevel(s.to_owned())),
        }
    }
}

/// An error attached to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionInfo {
    /// Fully qualified type name of the error.
    pub type_name: String,
    /// Its message.
    pub message: String,
}

impl ExceptionInfo {
    /// Captures `err` together with its type name.
    pub fn from_error<E: std::error::Error>(err: &E) -> Self {
        ExceptionInfo {
            type_name: std::any::type_name::<E>().to_owned(),
            message: err.to_string(),
        }
    }
}

/// One record emitted through a logger.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Dot-separated logger name.
    pub name: String,
    /// Severity.
    pub level: Level,
    /// The message.
    pub message: String,
    /// When the record was created.
    pub created: SystemTime,
    /// Source file.
    pub pathname: Option<String>,
    /// Source line.
    pub lineno: Option<u32>,
    /// Function name.
    pub func_name: Option<String>,
    /// Module path.
    pub module: Option<String>,
    /// Name of the emitting thread.
    pub thread_name: Option<String>,
    /// Id of the emitting thread.
    pub thread_id: Option<String>,
    /// Attached error.
    pub exception: Option<ExceptionInfo>,
    /// Structured fields carried alongside the message.
    pub extras: Fields,
}

impl Record {
    /// Creates a record stamped with the current time and thread.
    pub fn new(name: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        let thread = std::thread::current();
        Record {
            name: name.into(),
            level,
            message: message.into(),
            created: SystemTime::now(),
            pathname: None,
            lineno: None,
            func_name: None,
            module: None,
            thread_name: thread.name().map(str::to_owned),
            thread_id: Some(format!("{:?}", thread.id())),
            exception: None,
            extras: Fields::new(),
        }
    }

    /// Sets the source location.
    pub fn with_location(mut self, pathname: impl Into<String>, lineno: u32) -> Self {
        self.pathname = Some(pathname.into());
        self.lineno = Some(lineno);
        self
    }

    /// Sets the function name.
    pub fn with_func_name(mut self, func_name: impl Into<String>) -> Self {
        self.func_name = Some(func_name.into());
        self
    }

    /// Sets the module path.
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Attaches an error.
    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Sets the structured extras.
    pub fn with_extras(mut self, extras: Fields) -> Self {
        self.extras = extras;
        self
    }

    /// Sets the creation time.
    pub fn with_created(mut self, created: SystemTime) -> Self {
        self.created = created;
        self
    }
}

/// Receives records emitted through a logger and its descendants.
pub trait Handler: Send + Sync {
    /// Handles one record.
    fn handle(&self, record: &Record);
}

impl<F> Handler for F
where
    F: Fn(&Record) + Send + Sync,
{
    fn handle(&self, record: &Record) {
        self(record)
    }
}

/// Decides whether a record goes on.
pub trait Filter: Send + Sync {
    /// Returns `false` to drop the record.
    fn filter(&self, record: &Record) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&Record) -> bool + Send + Sync,
{
    fn filter(&self, record: &Record) -> bool {
        self(record)
    }
}

/// Control over a logger tree.
pub trait LoggerHierarchy: Send + Sync {
    /// Dispatches `record` through the logger named `record.name`.
    ///
    /// No level threshold is applied: the caller has already decided the
    /// record should be emitted. Filters and handlers still run.
    fn handle(&self, record: Record);

    /// Sets the threshold of the named logger.
    fn set_level(&self, name: &str, level: Level);

    /// Installs a filter on the named logger. It applies to records from that
    /// logger and all of its descendants.
    fn add_filter(&self, name: &str, filter: Arc<dyn Filter>);
}

impl<H: LoggerHierarchy + ?Sized> LoggerHierarchy for Arc<H> {
    fn handle(&self, record: Record) {
        (**self).handle(record)
    }

    fn set_level(&self, name: &str, level: Level) {
        (**self).set_level(name, level)
    }

    fn add_filter(&self, name: &str, filter: Arc<dyn Filter>) {
        (**self).add_filter(name, filter)
    }
}

/// The parent of a dot-separated logger name, `None` for the root.
pub fn parent_name(name: &str) -> Option<&str> {
    if name.is_empty() {
        return None;
    }
    Some(name.rfind('.').map_or(ROOT_LOGGER, |pos| &name[..pos]))
}
