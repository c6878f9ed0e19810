use std::sync::{Arc, Mutex};
use std::thread;

use log_bridge::fields;
use log_bridge::forward::HierarchyWriter;
use log_bridge::hierarchy::{Filter, Handler, Level, LoggerHierarchy, Record};
use log_bridge::platform::{LevelFlags, LogWriter, WriterOutput};
use log_bridge::reverse::WriterHandler;
use log_bridge::Fields;

const THREADS: usize = 8;
const PER_THREAD: usize = 250;

#[derive(Default)]
struct Collector {
    records: Mutex<Vec<Record>>,
}

impl LoggerHierarchy for Collector {
    fn handle(&self, record: Record) {
        self.records.lock().unwrap().push(record);
    }

    fn set_level(&self, _name: &str, _level: Level) {}

    fn add_filter(&self, _name: &str, _filter: Arc<dyn Filter>) {}
}

/// Every `(source, sequence)` pair must arrive once, and each source's
/// sequence numbers must arrive in order.
fn assert_complete_and_ordered(received: Vec<(String, usize)>) {
    assert_eq!(received.len(), THREADS * PER_THREAD);
    for t in 0..THREADS {
        let source = format!("worker{t}");
        let sequence: Vec<usize> = received
            .iter()
            .filter(|(s, _)| *s == source)
            .map(|(_, n)| *n)
            .collect();
        assert_eq!(sequence, (0..PER_THREAD).collect::<Vec<_>>(), "{source}");
    }
}

#[test]
fn one_hierarchy_writer_shared_by_many_threads() {
    let collector = Arc::new(Collector::default());
    let writer = HierarchyWriter::new(collector.clone());

    thread::scope(|s| {
        for t in 0..THREADS {
            let writer = &writer;
            s.spawn(move || {
                for n in 0..PER_THREAD {
                    let record = Fields::new()
                        .with(fields::GLIB_DOMAIN, format!("pool-worker{t}"))
                        .with(fields::MESSAGE, n.to_string());
                    assert_eq!(
                        writer.write(LevelFlags::LEVEL_WARNING, &record),
                        WriterOutput::Handled
                    );
                }
            });
        }
    });

    let records = std::mem::take(&mut *collector.records.lock().unwrap());
    assert!(records.iter().all(|r| r.level == Level::WARNING));
    let received = records
        .into_iter()
        .map(|r| {
            let source = r.name.strip_prefix("pool.").unwrap().to_string();
            (source, r.message.parse().unwrap())
        })
        .collect();
    assert_complete_and_ordered(received);
}

#[test]
fn one_writer_handler_shared_by_many_threads() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let sink = written.clone();
    let handler = WriterHandler::new(move |flags: LevelFlags, fields: &Fields| {
        assert_eq!(flags, LevelFlags::LEVEL_WARNING);
        let domain = fields.get_str(fields::GLIB_DOMAIN).unwrap_or_default();
        let message = fields.get_str(fields::MESSAGE).unwrap_or_default();
        sink.lock()
            .unwrap()
            .push((domain.to_string(), message.to_string()));
        WriterOutput::Handled
    });

    thread::scope(|s| {
        for t in 0..THREADS {
            let handler = &handler;
            s.spawn(move || {
                for n in 0..PER_THREAD {
                    handler.handle(&Record::new(
                        format!("pool.worker{t}"),
                        Level::WARNING,
                        n.to_string(),
                    ));
                }
            });
        }
    });

    let written = std::mem::take(&mut *written.lock().unwrap());
    let received = written
        .into_iter()
        .map(|(domain, message)| {
            let source = domain.strip_prefix("pool-").unwrap().to_string();
            (source, message.parse().unwrap())
        })
        .collect();
    assert_complete_and_ordered(received);
}
