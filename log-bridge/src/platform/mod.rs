//! # Platform logger interface
//!
//! The structured platform logger is an external runtime; this module holds
//! the parts of it the bridge plugs into:
//!
//! - [`LogWriter`]: the writer function that receives every structured record
//!   in the process. [`set_writer`] installs one and hands back a
//!   [`WriterRegistration`].
//! - [`log_structured`]: the structured entry point, dispatching to the
//!   installed writer (or the [`writers::DefaultWriter`]).
//! - [`LegacyLogFunc`] and [`log`]: the older `(domain, level, message)`
//!   entry point.
//!
//! Only one writer is active per process. Replacing it while a bridge writer
//! is installed is allowed but the caller owns the consequences.
use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::fields::{self, Fields};

pub mod writers;

/// Severity of a platform record, ordered from least to most severe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Debugging output, hidden unless the domain is enabled for debug.
    Debug,
    /// Informational output.
    Info,
    /// Normal but significant output.
    Message,
    /// Something is wrong but the program can continue.
    Warning,
    /// A serious problem. Not fatal by itself.
    Critical,
    /// Unrecoverable. The platform aborts the process after writing it.
    Error,
}

impl Level {
    /// Every level, least severe first.
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Info,
        Level::Message,
        Level::Warning,
        Level::Critical,
        Level::Error,
    ];

    /// The flag word carrying only this level.
    pub const fn flags(self) -> LevelFlags {
        match self {
            Level::Error => LevelFlags::LEVEL_ERROR,
            Level::Critical => LevelFlags::LEVEL_CRITICAL,
            Level::Warning => LevelFlags::LEVEL_WARNING,
            Level::Message => LevelFlags::LEVEL_MESSAGE,
            Level::Info => LevelFlags::LEVEL_INFO,
            Level::Debug => LevelFlags::LEVEL_DEBUG,
        }
    }

    /// journald priority of the level.
    pub const fn priority(self) -> u8 {
        match self {
            Level::Error => 3,
            Level::Critical | Level::Warning => 4,
            Level::Message => 5,
            Level::Info => 6,
            Level::Debug => 7,
        }
    }

    /// Upper-case name used by the standard stream writer.
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
            Level::Warning => "WARNING",
            Level::Message => "Message",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Level> for LevelFlags {
    fn from(level: Level) -> Self {
        level.flags()
    }
}

/// The raw level word passed to writers.
///
/// The low two bits are modifiers, the next six the standard levels, and
/// anything above is reserved for user-defined levels.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct LevelFlags(u32);

impl LevelFlags {
    /// Set when the record was emitted from inside a writer.
    pub const FLAG_RECURSION: LevelFlags = LevelFlags(1 << 0);
    /// Set when the record is fatal.
    pub const FLAG_FATAL: LevelFlags = LevelFlags(1 << 1);
    /// See [`Level::Error`].
    pub const LEVEL_ERROR: LevelFlags = LevelFlags(1 << 2);
    /// See [`Level::Critical`].
    pub const LEVEL_CRITICAL: LevelFlags = LevelFlags(1 << 3);
    /// See [`Level::Warning`].
    pub const LEVEL_WARNING: LevelFlags = LevelFlags(1 << 4);
    /// See [`Level::Message`].
    pub const LEVEL_MESSAGE: LevelFlags = LevelFlags(1 << 5);
    /// See [`Level::Info`].
    pub const LEVEL_INFO: LevelFlags = LevelFlags(1 << 6);
    /// See [`Level::Debug`].
    pub const LEVEL_DEBUG: LevelFlags = LevelFlags(1 << 7);
    /// Every bit that is not a modifier.
    pub const LEVEL_MASK: LevelFlags = LevelFlags(!((1 << 0) | (1 << 1)));

    const STANDARD_LEVELS: u32 = 0b1111_1100;

    /// Wraps a raw level word.
    pub const fn from_bits(bits: u32) -> Self {
        LevelFlags(bits)
    }

    /// The raw level word.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: LevelFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the fatal modifier is set.
    pub const fn is_fatal(self) -> bool {
        self.contains(Self::FLAG_FATAL)
    }

    /// Resolves the word to a single [`Level`].
    ///
    /// The most severe standard level bit wins. A word holding only
    /// user-defined level bits is less severe than any standard level and
    /// clamps to [`Level::Debug`]; a word without level bits falls back to
    /// [`Level::Info`].
    pub fn level(self) -> Level {
        let bits = self.0 & Self::LEVEL_MASK.0;
        let standard = bits & Self::STANDARD_LEVELS;
        if standard != 0 {
            // lowest set bit is the most severe level
            return match standard & standard.wrapping_neg() {
                b if b == Self::LEVEL_ERROR.0 => Level::Error,
                b if b == Self::LEVEL_CRITICAL.0 => Level::Critical,
                b if b == Self::LEVEL_WARNING.0 => Level::Warning,
                b if b == Self::LEVEL_MESSAGE.0 => Level::Message,
                b if b == Self::LEVEL_INFO.0 => Level::Info,
                _ => Level::Debug,
            };
        }
        if bits != 0 {
            bridge_debug!(name: "LevelFlags.UserLevelClamped", bits = bits);
            Level::Debug
        } else {
            Level::Info
        }
    }
}

impl fmt::Debug for LevelFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LevelFlags({:#x})", self.0)
    }
}

impl BitOr for LevelFlags {
    type Output = LevelFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        LevelFlags(self.0 | rhs.0)
    }
}

impl BitAnd for LevelFlags {
    type Output = LevelFlags;

    fn bitand(self, rhs: Self) -> Self::Output {
        LevelFlags(self.0 & rhs.0)
    }
}

/// What a writer did with a record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WriterOutput {
    /// The record was written; the platform must not output it again.
    Handled,
    /// The record was not written; the platform may fall back.
    Unhandled,
}

/// The platform's writer function: receives every structured record.
pub trait LogWriter: Send + Sync {
    /// Writes one record.
    fn write(&self, level: LevelFlags, fields: &Fields) -> WriterOutput;
}

impl<F> LogWriter for F
where
    F: Fn(LevelFlags, &Fields) -> WriterOutput + Send + Sync,
{
    fn write(&self, level: LevelFlags, fields: &Fields) -> WriterOutput {
        self(level, fields)
    }
}

/// The platform's legacy log function: domain, level and message only.
pub trait LegacyLogFunc: Send + Sync {
    /// Logs one message.
    fn log(&self, domain: Option<&str>, level: LevelFlags, message: &str);
}

impl<F> LegacyLogFunc for F
where
    F: Fn(Option<&str>, LevelFlags, &str) + Send + Sync,
{
    fn log(&self, domain: Option<&str>, level: LevelFlags, message: &str) {
        self(domain, level, message)
    }
}

static GLOBAL_WRITER: Lazy<RwLock<Option<Arc<dyn LogWriter>>>> = Lazy::new(|| RwLock::new(None));

static DEFAULT_WRITER: Lazy<writers::DefaultWriter> = Lazy::new(writers::DefaultWriter::from_env);

pub(crate) fn default_writer() -> &'static writers::DefaultWriter {
    &DEFAULT_WRITER
}

/// Proof that a writer was installed with [`set_writer`].
///
/// Holding the registration is how the caller keeps track of what it
/// installed; dropping it leaves the writer in place.
#[must_use = "keep the registration to be able to uninstall the writer"]
pub struct WriterRegistration {
    previous: Option<Arc<dyn LogWriter>>,
}

impl WriterRegistration {
    /// Restores the writer that was active before this registration.
    pub fn uninstall(self) {
        let mut writer = GLOBAL_WRITER
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *writer = self.previous;
    }

    /// Whether a writer was replaced by this registration.
    pub fn replaced_writer(&self) -> bool {
        self.previous.is_some()
    }
}

impl fmt::Debug for WriterRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterRegistration")
            .field("replaced_writer", &self.replaced_writer())
            .finish()
    }
}

/// Installs `writer` as the process-wide writer function.
pub fn set_writer(writer: Arc<dyn LogWriter>) -> WriterRegistration {
    let mut slot = GLOBAL_WRITER
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let previous = slot.replace(writer);
    if previous.is_some() {
        bridge_warn!(name: "Platform.SetWriter.Replaced");
    }
    WriterRegistration { previous }
}

/// Hands `fields` to the installed writer, or the default writer.
///
/// Falls back to the default writer when the installed one reports
/// [`WriterOutput::Unhandled`].
pub fn write_fields(level: LevelFlags, fields: &Fields) -> WriterOutput {
    // clone out of the lock: the writer may log again
    let writer = GLOBAL_WRITER
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone();
    if let Some(writer) = writer {
        if writer.write(level, fields) == WriterOutput::Handled {
            return WriterOutput::Handled;
        }
    }
    default_writer().write(level, fields)
}

/// The structured entry point.
///
/// Adds the domain field unless `fields` already carries one.
pub fn log_structured(domain: Option<&str>, level: LevelFlags, mut fields: Fields) -> WriterOutput {
    if let Some(domain) = domain {
        if !fields.contains_key(fields::GLIB_DOMAIN) {
            fields.insert(fields::GLIB_DOMAIN, domain);
        }
    }
    write_fields(level, &fields)
}

/// The legacy entry point.
pub fn log(domain: Option<&str>, level: LevelFlags, message: &str) -> WriterOutput {
    log_structured(
        domain,
        level,
        Fields::with_capacity(2).with(fields::MESSAGE, message),
    )
}
