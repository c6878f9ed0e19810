//! Platform → hierarchy.
//!
//! [`HierarchyWriter`] is a platform writer function. Every structured record
//! it receives becomes a [`Record`] on the logger named after the record's
//! domain:
//!
//! ```
//! use std::sync::{Arc, Mutex};
//!
//! use log_bridge::forward::HierarchyWriter;
//! use log_bridge::hierarchy::{Filter, Level, LoggerHierarchy, Record};
//! use log_bridge::platform::{LevelFlags, LogWriter};
//! use log_bridge::{fields, Fields};
//!
//! // The application's logger runtime; here it only keeps what it is given.
//! #[derive(Default)]
//! struct Loggers(Mutex<Vec<(String, Level)>>);
//!
//! impl LoggerHierarchy for Loggers {
//!     fn handle(&self, record: Record) {
//!         self.0.lock().unwrap().push((record.name, record.level));
//!     }
//!     fn set_level(&self, _: &str, _: Level) {}
//!     fn add_filter(&self, _: &str, _: Arc<dyn Filter>) {}
//! }
//!
//! let loggers = Arc::new(Loggers::default());
//! let writer = HierarchyWriter::builder(loggers.clone()).build();
//! let record = Fields::new()
//!     .with(fields::GLIB_DOMAIN, "net-io")
//!     .with(fields::MESSAGE, "link up");
//! writer.write(LevelFlags::LEVEL_CRITICAL, &record);
//!
//! assert_eq!(*loggers.0.lock().unwrap(), vec![("net.io".to_string(), Level::ERROR)]);
//! ```
use std::borrow::Cow;
use std::sync::Arc;

use crate::debug_filter::DebugFilter;
use crate::fields::{self, Fields};
use crate::hierarchy::{Level as HierarchyLevel, LoggerHierarchy, Record};
use crate::level;
use crate::namespace::NameMapping;
use crate::platform::{self, LegacyLogFunc, LevelFlags, LogWriter, WriterOutput, WriterRegistration};

/// Writer function that forwards platform records into a logger hierarchy.
///
/// The hierarchy receives the record without a level check; its own filters
/// and handlers still apply. The record's `extras` hold every field the
/// platform passed, including the ones already mapped to record attributes.
#[derive(Debug)]
pub struct HierarchyWriter<H> {
    hierarchy: H,
    mapping: NameMapping,
    use_priority_field: bool,
    debug_filter: Option<DebugFilter>,
}

impl<H: LoggerHierarchy> HierarchyWriter<H> {
    /// Creates a writer with the default configuration.
    pub fn new(hierarchy: H) -> Self {
        HierarchyWriter::builder(hierarchy).build()
    }

    /// Starts configuring a writer.
    pub fn builder(hierarchy: H) -> HierarchyWriterBuilder<H> {
        HierarchyWriterBuilder {
            hierarchy,
            mapping: NameMapping::default(),
            use_priority_field: false,
            debug_filter: None,
        }
    }

    /// The hierarchy records are forwarded to.
    pub fn hierarchy(&self) -> &H {
        &self.hierarchy
    }

    /// Builds the hierarchy record for a platform record.
    pub fn to_record(&self, flags: LevelFlags, fields: &Fields) -> Record {
        let name = self
            .mapping
            .to_logger_name(fields.get_str(fields::GLIB_DOMAIN));
        let message = fields
            .get(fields::MESSAGE)
            .map(|m| m.to_string_lossy())
            .unwrap_or(Cow::Borrowed(""));

        let mut record = Record::new(name, self.record_level(flags, fields), message)
            .with_extras(fields.clone());
        record.pathname = fields.get(fields::CODE_FILE).map(|v| v.to_string());
        record.lineno = fields
            .get_str(fields::CODE_LINE)
            .and_then(|line| line.trim().parse().ok());
        record.func_name = fields.get(fields::CODE_FUNC).map(|v| v.to_string());
        record
    }

    fn record_level(&self, flags: LevelFlags, fields: &Fields) -> HierarchyLevel {
        if self.use_priority_field {
            if let Some(level) = fields
                .get_str(fields::PRIORITY)
                .and_then(level::parse_priority)
            {
                return level;
            }
        }
        level::to_hierarchy(flags.level())
    }
}

impl<H: LoggerHierarchy + 'static> HierarchyWriter<H> {
    /// Installs this writer as the platform's writer function.
    pub fn install(self) -> WriterRegistration {
        platform::set_writer(Arc::new(self))
    }
}

impl<H: LoggerHierarchy> LogWriter for HierarchyWriter<H> {
    fn write(&self, flags: LevelFlags, fields: &Fields) -> WriterOutput {
        if let Some(filter) = &self.debug_filter {
            if !filter.should_pass_platform(flags.level(), fields.get_str(fields::GLIB_DOMAIN)) {
                // dropped on purpose, the platform must not print it either
                return WriterOutput::Handled;
            }
        }
        self.hierarchy.handle(self.to_record(flags, fields));
        WriterOutput::Handled
    }
}

impl<H: LoggerHierarchy> LegacyLogFunc for HierarchyWriter<H> {
    fn log(&self, domain: Option<&str>, flags: LevelFlags, message: &str) {
        let mut fields = Fields::with_capacity(2).with(fields::MESSAGE, message);
        if let Some(domain) = domain {
            fields.insert(fields::GLIB_DOMAIN, domain);
        }
        let _ = self.write(flags, &fields);
    }
}

/// Configuration for a [`HierarchyWriter`].
#[derive(Debug)]
pub struct HierarchyWriterBuilder<H> {
    hierarchy: H,
    mapping: NameMapping,
    use_priority_field: bool,
    debug_filter: Option<DebugFilter>,
}

impl<H: LoggerHierarchy> HierarchyWriterBuilder<H> {
    /// Prepends `prefix` to every logger name.
    pub fn with_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.mapping = self.mapping.with_prefix(prefix);
        self
    }

    /// Appends `suffix` to every logger name.
    pub fn with_suffix(mut self, suffix: impl Into<Cow<'static, str>>) -> Self {
        self.mapping = self.mapping.with_suffix(suffix);
        self
    }

    /// Replaces the whole name mapping.
    pub fn with_name_mapping(mut self, mapping: NameMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Takes the level from the journald `PRIORITY` field when it holds a
    /// number, and from the level word otherwise.
    pub fn with_priority_field(mut self, use_priority_field: bool) -> Self {
        self.use_priority_field = use_priority_field;
        self
    }

    /// Drops debug records of namespaces `filter` does not enable before
    /// they reach the hierarchy.
    pub fn with_debug_filter(mut self, filter: DebugFilter) -> Self {
        self.debug_filter = Some(filter);
        self
    }

    /// Builds the writer.
    pub fn build(self) -> HierarchyWriter<H> {
        HierarchyWriter {
            hierarchy: self.hierarchy,
            mapping: self.mapping,
            use_priority_field: self.use_priority_field,
            debug_filter: self.debug_filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_filter::DebugNamespaceSet;
    use crate::testing::InMemoryHierarchy;
    use rstest::rstest;

    fn record_fields(domain: &str, message: &str) -> Fields {
        Fields::new()
            .with(fields::GLIB_DOMAIN, domain)
            .with(fields::MESSAGE, message)
    }

    #[rstest]
    #[case(LevelFlags::LEVEL_ERROR, HierarchyLevel::CRITICAL)]
    #[case(LevelFlags::LEVEL_CRITICAL, HierarchyLevel::ERROR)]
    #[case(LevelFlags::LEVEL_WARNING, HierarchyLevel::WARNING)]
    #[case(LevelFlags::LEVEL_MESSAGE, HierarchyLevel::INFO)]
    #[case(LevelFlags::LEVEL_INFO, HierarchyLevel::INFO)]
    #[case(LevelFlags::LEVEL_DEBUG, HierarchyLevel::DEBUG)]
    #[case(LevelFlags::LEVEL_WARNING | LevelFlags::FLAG_FATAL, HierarchyLevel::WARNING)]
    fn maps_levels(#[case] flags: LevelFlags, #[case] expected: HierarchyLevel) {
        let hierarchy = InMemoryHierarchy::default();
        let writer = HierarchyWriter::new(hierarchy.clone());
        assert_eq!(
            writer.write(flags, &record_fields("app", "m")),
            WriterOutput::Handled
        );
        assert_eq!(hierarchy.get_emitted_records().unwrap()[0].level, expected);
    }

    #[test]
    fn builds_record_from_fields() {
        let hierarchy = InMemoryHierarchy::default();
        let writer = HierarchyWriter::new(hierarchy.clone());
        let fields = record_fields("net-io", "connected")
            .with(fields::CODE_FILE, "net/io.c")
            .with(fields::CODE_LINE, "42")
            .with(fields::CODE_FUNC, "net_io_connect")
            .with("PEER", "10.0.0.1");

        writer.write(LevelFlags::LEVEL_INFO, &fields);

        let records = hierarchy.get_emitted_records().unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name, "net.io");
        assert_eq!(record.message, "connected");
        assert_eq!(record.pathname.as_deref(), Some("net/io.c"));
        assert_eq!(record.lineno, Some(42));
        assert_eq!(record.func_name.as_deref(), Some("net_io_connect"));
        assert_eq!(record.extras, fields);
    }

    #[test]
    fn missing_fields_are_tolerated() {
        let hierarchy = InMemoryHierarchy::default();
        let writer = HierarchyWriter::new(hierarchy.clone());
        let fields = Fields::new().with(fields::CODE_LINE, "not a number");

        writer.write(LevelFlags::LEVEL_WARNING, &fields);

        let record = &hierarchy.get_emitted_records().unwrap()[0];
        assert_eq!(record.name, "");
        assert_eq!(record.message, "");
        assert_eq!(record.lineno, None);
        assert_eq!(record.pathname, None);
    }

    #[test]
    fn binary_message_is_decoded_lossily() {
        let hierarchy = InMemoryHierarchy::default();
        let writer = HierarchyWriter::new(hierarchy.clone());
        let fields = Fields::new().with(fields::MESSAGE, vec![b'o', b'k', 0xff]);

        writer.write(LevelFlags::LEVEL_INFO, &fields);

        assert_eq!(hierarchy.get_emitted_records().unwrap()[0].message, "ok\u{fffd}");
    }

    #[test]
    fn prefix_and_suffix() {
        let hierarchy = InMemoryHierarchy::default();
        let writer = HierarchyWriter::builder(hierarchy.clone())
            .with_prefix("glib.")
            .with_suffix(".native")
            .build();

        writer.write(LevelFlags::LEVEL_INFO, &record_fields("Gtk", "x"));

        assert_eq!(hierarchy.get_emitted_records().unwrap()[0].name, "glib.Gtk.native");
    }

    #[rstest]
    #[case(Some("3"), HierarchyLevel::ERROR)]
    #[case(Some("0"), HierarchyLevel::CRITICAL)]
    #[case(Some("7"), HierarchyLevel::DEBUG)]
    #[case(Some("loud"), HierarchyLevel::WARNING)]
    #[case(None, HierarchyLevel::WARNING)]
    fn priority_field(#[case] priority: Option<&str>, #[case] expected: HierarchyLevel) {
        let hierarchy = InMemoryHierarchy::default();
        let writer = HierarchyWriter::builder(hierarchy.clone())
            .with_priority_field(true)
            .build();
        let mut fields = record_fields("app", "m");
        if let Some(priority) = priority {
            fields.insert(fields::PRIORITY, priority);
        }

        writer.write(LevelFlags::LEVEL_WARNING, &fields);

        assert_eq!(hierarchy.get_emitted_records().unwrap()[0].level, expected);
    }

    #[test]
    fn priority_field_is_ignored_by_default() {
        let hierarchy = InMemoryHierarchy::default();
        let writer = HierarchyWriter::new(hierarchy.clone());
        let fields = record_fields("app", "m").with(fields::PRIORITY, "3");

        writer.write(LevelFlags::LEVEL_DEBUG, &fields);

        assert_eq!(hierarchy.get_emitted_records().unwrap()[0].level, HierarchyLevel::DEBUG);
    }

    #[test]
    fn debug_filter_drops_but_reports_handled() {
        let hierarchy = InMemoryHierarchy::default();
        let writer = HierarchyWriter::builder(hierarchy.clone())
            .with_debug_filter(DebugFilter::new(DebugNamespaceSet::parse("net sys")))
            .build();

        let dropped = writer.write(LevelFlags::LEVEL_DEBUG, &record_fields("ui", "hidden"));
        writer.write(LevelFlags::LEVEL_DEBUG, &record_fields("net-io", "shown"));
        writer.write(LevelFlags::LEVEL_INFO, &record_fields("ui", "not debug"));

        assert_eq!(dropped, WriterOutput::Handled);
        let messages: Vec<_> = hierarchy
            .get_emitted_records().unwrap()
            .into_iter()
            .map(|r| r.message)
            .collect();
        assert_eq!(messages, vec!["shown", "not debug"]);
    }

    #[test]
    fn legacy_log_func() {
        let hierarchy = InMemoryHierarchy::default();
        let writer = HierarchyWriter::new(hierarchy.clone());

        writer.log(Some("net-io"), LevelFlags::LEVEL_MESSAGE, "legacy");
        writer.log(None, LevelFlags::LEVEL_WARNING, "rootless");

        let records = hierarchy.get_emitted_records().unwrap();
        assert_eq!(records[0].name, "net.io");
        assert_eq!(records[0].level, HierarchyLevel::INFO);
        assert_eq!(records[0].extras.get_str(fields::GLIB_DOMAIN), Some("net-io"));
        assert_eq!(records[1].name, "");
        assert!(!records[1].extras.contains_key(fields::GLIB_DOMAIN));
    }
}
