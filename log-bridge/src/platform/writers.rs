//! The writers the platform ships with.
//!
//! [`DefaultWriter`] is what the platform uses when no writer is installed:
//! it hides debug output of domains that are not enabled, then writes to the
//! journal when stderr is connected to it and to the standard streams
//! otherwise.
use std::fmt::Write as _;
use std::io::{self, Write as _};

use chrono::{DateTime, Local};

use super::{LegacyLogFunc, Level, LevelFlags, LogWriter, WriterOutput};
use crate::debug_filter::DebugNamespaceSet;
use crate::error::{BridgeError, BridgeResult};
use crate::fields::{self, Fields};

/// Writes human-readable lines to stdout and stderr.
///
/// `ERROR`, `CRITICAL`, `WARNING` and `MESSAGE` go to stderr, `INFO` and
/// `DEBUG` to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardStreamsWriter {
    _private: (),
}

impl StandardStreamsWriter {
    /// Creates the writer.
    pub fn new() -> Self {
        StandardStreamsWriter::default()
    }
}

impl LogWriter for StandardStreamsWriter {
    fn write(&self, flags: LevelFlags, fields: &Fields) -> WriterOutput {
        let level = flags.level();
        let mut line = format_line(level, fields, Local::now());
        line.push('\n');
        let result = if level >= Level::Message {
            io::stderr().lock().write_all(line.as_bytes())
        } else {
            io::stdout().lock().write_all(line.as_bytes())
        };
        match result {
            Ok(()) => WriterOutput::Handled,
            Err(_) => WriterOutput::Unhandled,
        }
    }
}

pub(crate) fn format_line(level: Level, fields: &Fields, now: DateTime<Local>) -> String {
    let mut line = String::with_capacity(64);
    match fields.get_str(fields::GLIB_DOMAIN) {
        Some(domain) if !domain.is_empty() => {
            line.push_str(domain);
            line.push('-');
        }
        _ => {
            let _ = write!(line, "(process:{}): ", std::process::id());
        }
    }
    line.push_str(level.as_str());
    if level >= Level::Warning {
        line.push_str(" **");
    }
    let message = fields
        .get(fields::MESSAGE)
        .map(|m| m.to_string_lossy())
        .unwrap_or_default();
    let _ = write!(line, ": {}: {}", now.format("%H:%M:%S%.3f"), message);
    line
}

/// Sends records to the systemd journal.
///
/// `MESSAGE` and `PRIORITY` become the entry's message and priority (the
/// priority falls back to the one of the level). Keys the journal rejects are
/// skipped. On targets without a journal every write is `Unhandled`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JournalWriter {
    _private: (),
}

impl JournalWriter {
    /// Creates the writer.
    pub fn new() -> Self {
        JournalWriter::default()
    }

    #[cfg(target_os = "linux")]
    fn send(&self, level: Level, fields: &Fields) -> BridgeResult<()> {
        let priority = fields
            .get_str(fields::PRIORITY)
            .and_then(|p| p.trim().parse::<u8>().ok())
            .unwrap_or_else(|| level.priority());
        let message = fields
            .get(fields::MESSAGE)
            .map(|m| m.to_string_lossy())
            .unwrap_or_default();
        let vars = fields
            .iter()
            .filter(|(key, _)| *key != fields::MESSAGE && *key != fields::PRIORITY)
            .filter(|(key, _)| is_journal_key(key))
            .map(|(key, value)| (key, value.to_string_lossy()));
        libsystemd::logging::journal_send(journal_priority(priority), &message, vars)
            .map_err(|err| BridgeError::JournalUnavailable(err.to_string()))
    }

    #[cfg(not(target_os = "linux"))]
    fn send(&self, _level: Level, _fields: &Fields) -> BridgeResult<()> {
        Err(BridgeError::JournalUnavailable(
            "the journal only exists on linux".to_string(),
        ))
    }
}

impl LogWriter for JournalWriter {
    fn write(&self, flags: LevelFlags, fields: &Fields) -> WriterOutput {
        match self.send(flags.level(), fields) {
            Ok(()) => WriterOutput::Handled,
            Err(err) => {
                bridge_debug!(
                    name: "JournalWriter.SendFailed",
                    error = format!("{}", err)
                );
                WriterOutput::Unhandled
            }
        }
    }
}

#[cfg(target_os = "linux")]
fn journal_priority(priority: u8) -> libsystemd::logging::Priority {
    use libsystemd::logging::Priority;

    match priority {
        0 => Priority::Emergency,
        1 => Priority::Alert,
        2 => Priority::Critical,
        3 => Priority::Error,
        4 => Priority::Warning,
        5 => Priority::Notice,
        6 => Priority::Info,
        _ => Priority::Debug,
    }
}

/// Journal field names: uppercase ASCII, digits and `_`, not starting with
/// `_` or a digit, at most 64 bytes.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn is_journal_key(key: &str) -> bool {
    let mut bytes = key.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }
    key.len() <= 64 && bytes.all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

/// Whether stderr is a stream connected to the journal.
pub fn stderr_is_journal() -> bool {
    #[cfg(target_os = "linux")]
    {
        libsystemd::logging::connected_to_journal()
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

/// The platform's fallback writer.
#[derive(Debug)]
pub struct DefaultWriter {
    debug_namespaces: DebugNamespaceSet,
    use_journal: bool,
    journal: JournalWriter,
    streams: StandardStreamsWriter,
}

impl DefaultWriter {
    /// Creates the writer with an explicit debug-namespace set.
    pub fn new(debug_namespaces: DebugNamespaceSet) -> Self {
        DefaultWriter {
            debug_namespaces,
            use_journal: stderr_is_journal(),
            journal: JournalWriter::new(),
            streams: StandardStreamsWriter::new(),
        }
    }

    /// Creates the writer, reading the debug-namespace set from the
    /// environment once.
    pub fn from_env() -> Self {
        DefaultWriter::new(DebugNamespaceSet::from_env())
    }

    /// Whether this writer would drop a record of `level` in `domain`.
    pub fn is_suppressed(&self, level: Level, domain: Option<&str>) -> bool {
        level == Level::Debug && !self.debug_namespaces.is_enabled(domain)
    }
}

impl LogWriter for DefaultWriter {
    fn write(&self, flags: LevelFlags, fields: &Fields) -> WriterOutput {
        if self.is_suppressed(flags.level(), fields.get_str(fields::GLIB_DOMAIN)) {
            return WriterOutput::Handled;
        }
        if self.use_journal && self.journal.write(flags, fields) == WriterOutput::Handled {
            return WriterOutput::Handled;
        }
        self.streams.write(flags, fields)
    }
}

/// The platform's legacy default log function.
///
/// Builds `MESSAGE`, `GLIB_DOMAIN` and `PRIORITY` and hands them to the
/// default writer.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLogFunc {
    _private: (),
}

impl DefaultLogFunc {
    /// Creates the log function.
    pub fn new() -> Self {
        DefaultLogFunc::default()
    }
}

impl LegacyLogFunc for DefaultLogFunc {
    fn log(&self, domain: Option<&str>, flags: LevelFlags, message: &str) {
        let level = flags.level();
        let mut fields = Fields::with_capacity(3)
            .with(fields::MESSAGE, message)
            .with(fields::PRIORITY, u32::from(level.priority()));
        if let Some(domain) = domain {
            fields.insert(fields::GLIB_DOMAIN, domain);
        }
        let _ = super::default_writer().write(flags, &fields);
    }
}
