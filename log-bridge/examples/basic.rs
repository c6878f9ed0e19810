use std::sync::Arc;

use log_bridge::debug_filter::DebugFilter;
use log_bridge::forward::HierarchyWriter;
use log_bridge::hierarchy::{Filter, Handler, Level, LoggerHierarchy, Record};
use log_bridge::platform::{self, LevelFlags};
use log_bridge::reverse::StructuredHandler;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Stands in for the application's logger runtime: prints every record and
/// passes the `app` subtree on to the platform.
struct AppLoggers {
    to_platform: StructuredHandler,
}

impl LoggerHierarchy for AppLoggers {
    fn handle(&self, record: Record) {
        println!("[{}] {}: {}", record.level, record.name, record.message);
        if record.name == "app" || record.name.starts_with("app.") {
            self.to_platform.handle(&record);
        }
    }

    fn set_level(&self, name: &str, level: Level) {
        println!("level of {name:?} set to {level}");
    }

    fn add_filter(&self, _name: &str, _filter: Arc<dyn Filter>) {}
}

fn main() {
    // Show the bridge's own diagnostics (writer swaps, filter setup).
    let filter_fmt = EnvFilter::new("info").add_directive("log-bridge=debug".parse().unwrap());
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(filter_fmt))
        .init();

    let loggers = Arc::new(AppLoggers {
        to_platform: StructuredHandler::new(),
    });

    // Platform records land under `native.*`; the prefix keeps them out of
    // the `app` subtree that goes back to the platform.
    let registration = HierarchyWriter::builder(loggers.clone())
        .with_prefix("native.")
        .with_debug_filter(DebugFilter::from_env())
        .build()
        .install();

    platform::log(Some("Gtk"), LevelFlags::LEVEL_WARNING, "theme not found");
    platform::log(Some("Gtk"), LevelFlags::LEVEL_DEBUG, "shown with G_MESSAGES_DEBUG=Gtk");

    // printed twice: once as `app.db`, once after the round trip as
    // `native.app.db`
    loggers.handle(Record::new("app.db", Level::ERROR, "query timed out"));

    registration.uninstall();
}
