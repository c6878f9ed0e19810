//! # log-bridge
//!
//! This crate bridges two independent logging facilities so that records
//! emitted on one side are re-emitted, faithfully, on the other:
//!
//! - the **platform** logger: structured records made of key/value fields,
//!   dash-separated *domains* (`net-io`), an enumerated severity carried in a
//!   bit-flag word, and a single process-wide *writer function* that receives
//!   every record (journald, standard streams, ...).
//! - the **hierarchy** logger: an application logger tree with dot-separated
//!   names (`net.io`), numeric severities (`DEBUG = 10` ... `CRITICAL = 50`),
//!   per-logger thresholds, handlers and filters.
//!
//! ## Directions
//!
//! | Direction              | Adapter                              | Extension point            |
//! |------------------------|--------------------------------------|----------------------------|
//! | platform → hierarchy   | [`forward::HierarchyWriter`]         | [`platform::LogWriter`]    |
//! | hierarchy → platform   | [`reverse::StructuredHandler`]       | [`hierarchy::Handler`]     |
//! | hierarchy → writer     | [`reverse::WriterHandler`]           | [`hierarchy::Handler`]     |
//! | hierarchy → legacy     | [`reverse::LegacyHandler`] (lossy)   | [`hierarchy::Handler`]     |
//!
//! Both directions run synchronously on the emitting thread. Adapters keep no
//! mutable state: only the level tables and the parsed debug-namespace set,
//! which are safe to read concurrently.
//!
//! ## Getting started
//!
//! ```no_run
//! use std::sync::Arc;
//! use log_bridge::forward::HierarchyWriter;
//! use log_bridge::hierarchy::{Filter, Handler, Level, LoggerHierarchy, Record};
//! use log_bridge::reverse;
//!
//! /// Glue to the application's own logger runtime.
//! struct AppLoggers;
//!
//! impl LoggerHierarchy for AppLoggers {
//!     fn handle(&self, record: Record) {
//!         println!("{} {}: {}", record.level, record.name, record.message);
//!     }
//!     fn set_level(&self, _name: &str, _level: Level) {}
//!     fn add_filter(&self, _name: &str, _filter: Arc<dyn Filter>) {}
//! }
//!
//! // Platform records are re-emitted on the application's loggers.
//! let registration = HierarchyWriter::new(AppLoggers).install();
//!
//! // A handler the application attaches to its `audit` logger.
//! let journal = reverse::writer_handler_journal();
//! journal.handle(&Record::new("audit", Level::WARNING, "login failed"));
//! # registration.uninstall();
//! ```
//!
//! ## Mapping details
//!
//! | platform    | hierarchy  | notes                                                 |
//! |-------------|------------|-------------------------------------------------------|
//! | `ERROR`     | `CRITICAL` | the platform treats `ERROR` as fatal, never produced  |
//! | `CRITICAL`  | `ERROR`    | hierarchy `ERROR` and above map back to `CRITICAL`    |
//! | `WARNING`   | `WARNING`  |                                                       |
//! | `MESSAGE`   | `INFO`     | `INFO` maps back to platform `INFO`                   |
//! | `INFO`      | `INFO`     |                                                       |
//! | `DEBUG`     | `DEBUG`    | anything below `INFO` maps back to `DEBUG`            |
//!
//! Round trips preserve ordering but not always the exact value.
//!
//! ## Loops
//!
//! Installing a [`forward::HierarchyWriter`] and a
//! [`reverse::StructuredHandler`] on overlapping namespaces forwards each
//! record back and forth forever. Nothing here detects that; keep the two
//! directions on disjoint parts of the tree.
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![allow(clippy::needless_doctest_main)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]

#[macro_use]
mod internal_logging;

pub mod debug_filter;
mod error;
pub mod fields;
pub mod forward;
pub mod hierarchy;
pub mod level;
pub mod namespace;
pub mod platform;
pub mod reverse;

/// In-memory capture fixtures for tests.
#[cfg(any(feature = "testing", test))]
#[cfg_attr(docsrs, doc(cfg(any(feature = "testing", test))))]
pub mod testing;

pub use error::{BridgeError, BridgeResult};
pub use fields::{FieldValue, Fields};

#[doc(hidden)]
#[cfg(feature = "internal-logs")]
pub mod _private {
    pub use tracing::{debug, warn};
}
