//! Hierarchy → platform.
//!
//! Three [`Handler`]s turn hierarchy records into platform records:
//!
//! - [`StructuredHandler`] goes through the platform's structured entry
//!   point, so whatever writer is installed receives the record.
//! - [`WriterHandler`] calls one writer directly, bypassing the installed
//!   one.
//! - [`LegacyHandler`] calls a legacy log function. Only the domain, level
//!   and message survive; every other field is dropped.
//!
//! All three translate the record with a [`RecordConverter`]:
//!
//! | field                 | source                              |
//! |-----------------------|-------------------------------------|
//! | `MESSAGE`             | message                             |
//! | `CODE_FUNC`           | function name, when known           |
//! | `CODE_FILE`           | path name, when known               |
//! | `CODE_LINE`           | line number, when known             |
//! | `LOGGER_MESSAGE`      | message                             |
//! | `LOGGER_MODULE`       | module, when known                  |
//! | `LOGGER_NAME`         | logger name                         |
//! | `LOGGER_THREAD_NAME`  | thread name, when known             |
//! | `LOGGER_THREAD_ID`    | thread id, when known               |
//! | `LOGGER_EXC`          | error type name, when attached      |
//! | `LOGGER_EXC_MESSAGE`  | error message, when attached        |
//! | anything else         | the record's `extras`, which win    |
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::fields::{self, Fields};
use crate::hierarchy::{Filter, Handler, Level as HierarchyLevel, Record};
use crate::level;
use crate::namespace::NameMapping;
use crate::platform::writers::{DefaultLogFunc, JournalWriter, StandardStreamsWriter};
use crate::platform::{self, LegacyLogFunc, Level as PlatformLevel, LevelFlags, LogWriter};

/// Translates hierarchy records into platform domain, level and fields.
#[derive(Debug, Clone)]
pub struct RecordConverter {
    mapping: NameMapping,
    include_extras: bool,
}

impl Default for RecordConverter {
    fn default() -> Self {
        RecordConverter {
            mapping: NameMapping::default(),
            include_extras: true,
        }
    }
}

impl RecordConverter {
    /// Creates a converter with the default name mapping that copies
    /// `extras`.
    pub fn new() -> Self {
        RecordConverter::default()
    }

    /// Sets how logger names become domains.
    pub fn with_name_mapping(mut self, mapping: NameMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Whether the record's `extras` are copied into the fields.
    pub fn with_extras(mut self, include_extras: bool) -> Self {
        self.include_extras = include_extras;
        self
    }

    /// The name mapping.
    pub fn name_mapping(&self) -> &NameMapping {
        &self.mapping
    }

    /// The platform domain of `record`.
    pub fn domain(&self, record: &Record) -> Option<String> {
        self.mapping.to_domain(&record.name)
    }

    /// The platform level of `record`.
    pub fn level(&self, record: &Record) -> PlatformLevel {
        level::to_platform(record.level)
    }

    /// The platform fields of `record`.
    pub fn fields(&self, record: &Record) -> Fields {
        let mut out = Fields::with_capacity(10 + record.extras.len());
        out.insert(fields::MESSAGE, record.message.as_str());
        if let Some(func_name) = &record.func_name {
            out.insert(fields::CODE_FUNC, func_name.as_str());
        }
        if let Some(pathname) = &record.pathname {
            out.insert(fields::CODE_FILE, pathname.as_str());
        }
        if let Some(lineno) = record.lineno {
            out.insert(fields::CODE_LINE, lineno);
        }

        out.insert(fields::LOGGER_MESSAGE, record.message.as_str());
        if let Some(module) = &record.module {
            out.insert(fields::LOGGER_MODULE, module.as_str());
        }
        out.insert(fields::LOGGER_NAME, record.name.as_str());
        if let Some(thread_name) = &record.thread_name {
            out.insert(fields::LOGGER_THREAD_NAME, thread_name.as_str());
        }
        if let Some(thread_id) = &record.thread_id {
            out.insert(fields::LOGGER_THREAD_ID, thread_id.as_str());
        }

        if let Some(exception) = &record.exception {
            out.insert(fields::LOGGER_EXC, exception.type_name.as_str());
            out.insert(fields::LOGGER_EXC_MESSAGE, exception.message.as_str());
        }

        if self.include_extras {
            out.extend_from(&record.extras);
        }
        out
    }
}

#[derive(Clone)]
struct HandlerOptions {
    converter: RecordConverter,
    level: HierarchyLevel,
    filters: Vec<Arc<dyn Filter>>,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        HandlerOptions {
            converter: RecordConverter::default(),
            level: HierarchyLevel::NOTSET,
            filters: Vec::new(),
        }
    }
}

impl HandlerOptions {
    fn accepts(&self, record: &Record) -> bool {
        record.level >= self.level && self.filters.iter().all(|f| f.filter(record))
    }
}

impl fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerOptions")
            .field("converter", &self.converter)
            .field("level", &self.level)
            .field("filters", &self.filters.len())
            .finish()
    }
}

macro_rules! handler_builder_methods {
    () => {
        /// Ignores records below `level`.
        pub fn with_level(mut self, level: HierarchyLevel) -> Self {
            self.options.level = level;
            self
        }

        /// Adds a filter. Records must pass every filter.
        pub fn with_filter(mut self, filter: Arc<dyn Filter>) -> Self {
            self.options.filters.push(filter);
            self
        }

        /// Prepends `prefix` to every domain.
        pub fn with_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
            let mapping = self.options.converter.mapping.clone().with_prefix(prefix);
            self.options.converter.mapping = mapping;
            self
        }

        /// Appends `suffix` to every domain.
        pub fn with_suffix(mut self, suffix: impl Into<Cow<'static, str>>) -> Self {
            let mapping = self.options.converter.mapping.clone().with_suffix(suffix);
            self.options.converter.mapping = mapping;
            self
        }

        /// Uses `separator` instead of `-` between domain segments.
        pub fn with_separator(mut self, separator: char) -> Self {
            let mapping = self.options.converter.mapping.clone().with_separator(separator);
            self.options.converter.mapping = mapping;
            self
        }

        /// Replaces the record converter.
        pub fn with_converter(mut self, converter: RecordConverter) -> Self {
            self.options.converter = converter;
            self
        }
    };
}

/// Forwards records to the platform's structured entry point.
#[derive(Debug, Clone, Default)]
pub struct StructuredHandler {
    options: HandlerOptions,
}

impl StructuredHandler {
    /// Creates a handler with the default configuration.
    pub fn new() -> Self {
        StructuredHandler::default()
    }

    /// Starts configuring a handler.
    pub fn builder() -> StructuredHandlerBuilder {
        StructuredHandlerBuilder {
            options: HandlerOptions::default(),
        }
    }
}

impl Handler for StructuredHandler {
    fn handle(&self, record: &Record) {
        if !self.options.accepts(record) {
            return;
        }
        let converter = &self.options.converter;
        let domain = converter.domain(record);
        let _ = platform::log_structured(
            domain.as_deref(),
            converter.level(record).flags(),
            converter.fields(record),
        );
    }
}

/// Configuration for a [`StructuredHandler`].
#[derive(Debug)]
pub struct StructuredHandlerBuilder {
    options: HandlerOptions,
}

impl StructuredHandlerBuilder {
    handler_builder_methods!();

    /// Builds the handler.
    pub fn build(self) -> StructuredHandler {
        StructuredHandler {
            options: self.options,
        }
    }
}

/// Forwards records to one platform writer.
///
/// Adds `GLIB_DOMAIN` when the converted fields do not carry it, since the
/// writer is called without going through the structured entry point.
#[derive(Debug)]
pub struct WriterHandler<W> {
    writer: W,
    options: HandlerOptions,
}

impl<W: LogWriter> WriterHandler<W> {
    /// Creates a handler for `writer` with the default configuration.
    pub fn new(writer: W) -> Self {
        WriterHandler::builder(writer).build()
    }

    /// Starts configuring a handler for `writer`.
    pub fn builder(writer: W) -> WriterHandlerBuilder<W> {
        WriterHandlerBuilder {
            writer,
            options: HandlerOptions::default(),
        }
    }

    /// The platform level word and fields `record` is written with.
    pub fn to_platform(&self, record: &Record) -> (LevelFlags, Fields) {
        let converter = &self.options.converter;
        let mut fields = converter.fields(record);
        if !fields.contains_key(fields::GLIB_DOMAIN) {
            if let Some(domain) = converter.domain(record) {
                fields.insert(fields::GLIB_DOMAIN, domain);
            }
        }
        (converter.level(record).flags(), fields)
    }
}

impl<W: LogWriter> Handler for WriterHandler<W> {
    fn handle(&self, record: &Record) {
        if !self.options.accepts(record) {
            return;
        }
        let (flags, fields) = self.to_platform(record);
        let _ = self.writer.write(flags, &fields);
    }
}

/// Configuration for a [`WriterHandler`].
#[derive(Debug)]
pub struct WriterHandlerBuilder<W> {
    writer: W,
    options: HandlerOptions,
}

impl<W: LogWriter> WriterHandlerBuilder<W> {
    handler_builder_methods!();

    /// Builds the handler.
    pub fn build(self) -> WriterHandler<W> {
        WriterHandler {
            writer: self.writer,
            options: self.options,
        }
    }
}

/// Forwards records to a legacy log function.
///
/// Lossy: only the domain, level and message reach the function.
#[derive(Debug)]
pub struct LegacyHandler<F> {
    func: F,
    options: HandlerOptions,
}

impl<F: LegacyLogFunc> LegacyHandler<F> {
    /// Creates a handler for `func` with the default configuration.
    pub fn new(func: F) -> Self {
        LegacyHandler::builder(func).build()
    }

    /// Starts configuring a handler for `func`.
    pub fn builder(func: F) -> LegacyHandlerBuilder<F> {
        LegacyHandlerBuilder {
            func,
            options: HandlerOptions::default(),
        }
    }
}

impl<F: LegacyLogFunc> Handler for LegacyHandler<F> {
    fn handle(&self, record: &Record) {
        if !self.options.accepts(record) {
            return;
        }
        let converter = &self.options.converter;
        let domain = converter.domain(record);
        self.func.log(
            domain.as_deref(),
            converter.level(record).flags(),
            &record.message,
        );
    }
}

/// Configuration for a [`LegacyHandler`].
#[derive(Debug)]
pub struct LegacyHandlerBuilder<F> {
    func: F,
    options: HandlerOptions,
}

impl<F: LegacyLogFunc> LegacyHandlerBuilder<F> {
    handler_builder_methods!();

    /// Builds the handler.
    pub fn build(self) -> LegacyHandler<F> {
        LegacyHandler {
            func: self.func,
            options: self.options,
        }
    }
}

static WRITER_HANDLER_DEFAULT: Lazy<Arc<dyn Handler>> = Lazy::new(|| {
    Arc::new(WriterHandler::new(|flags: LevelFlags, fields: &Fields| {
        platform::default_writer().write(flags, fields)
    }))
});

static WRITER_HANDLER_STANDARD_STREAMS: Lazy<Arc<dyn Handler>> =
    Lazy::new(|| Arc::new(WriterHandler::new(StandardStreamsWriter::new())));

static WRITER_HANDLER_JOURNAL: Lazy<Arc<dyn Handler>> =
    Lazy::new(|| Arc::new(WriterHandler::new(JournalWriter::new())));

static LEGACY_HANDLER_DEFAULT: Lazy<Arc<dyn Handler>> =
    Lazy::new(|| Arc::new(LegacyHandler::new(DefaultLogFunc::new())));

/// Shared handler writing to the platform's default writer.
pub fn writer_handler_default() -> Arc<dyn Handler> {
    WRITER_HANDLER_DEFAULT.clone()
}

/// Shared handler writing to the standard streams writer.
pub fn writer_handler_standard_streams() -> Arc<dyn Handler> {
    WRITER_HANDLER_STANDARD_STREAMS.clone()
}

/// Shared handler writing to the journal.
pub fn writer_handler_journal() -> Arc<dyn Handler> {
    WRITER_HANDLER_JOURNAL.clone()
}

/// Shared handler calling the platform's legacy default log function.
///
/// Lossy, see [`LegacyHandler`].
pub fn legacy_handler_default() -> Arc<dyn Handler> {
    LEGACY_HANDLER_DEFAULT.clone()
}
