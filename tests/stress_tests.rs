//! Stress tests for concurrent use of one logger
//!
//! These tests verify:
//! - Records from many threads arrive whole and uncorrupted
//! - Concurrent close calls tear the sink down exactly once
//! - Logging racing with close neither panics nor writes after teardown,
//!   and every call is counted as either logged or dropped

use fieldlog::prelude::*;
use parking_lot::Mutex;
use std::fs;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Sink that counts writes and closes and remembers every record
#[derive(Clone, Default)]
struct CountingSink {
    records: Arc<Mutex<Vec<Vec<u8>>>>,
    closes: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
    writes_after_close: Arc<AtomicUsize>,
}

impl Sink for CountingSink {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if self.closed.load(Ordering::SeqCst) {
            self.writes_after_close.fetch_add(1, Ordering::SeqCst);
        }
        self.records.lock().push(buf.to_vec());
        Ok(buf.len())
    }

    fn close(&mut self) -> Result<()> {
        // widen the window in which other closers could slip through
        thread::sleep(Duration::from_millis(5));
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

fn counting_logger(format: OutputFormat) -> (Arc<Logger>, CountingSink) {
    let sink = CountingSink::default();
    let logger = Logger::builder()
        .console(false)
        .level(LevelMask::DEBUG_AND_ABOVE)
        .format(format)
        .sink(sink.clone())
        .build()
        .expect("valid config");
    (Arc::new(logger), sink)
}

#[test]
fn test_concurrent_logging_keeps_records_whole() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 1000;

    let (logger, sink) = counting_logger(OutputFormat::Json);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.info_with(
                        "concurrent",
                        [
                            Field::uint("thread", t as u64),
                            Field::uint("seq", i as u64),
                            Field::string("payload", "x".repeat(i % 64)),
                        ],
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("logging thread panicked");
    }

    let records = sink.records.lock();
    assert_eq!(records.len(), THREADS * PER_THREAD);
    assert_eq!(logger.metrics().total_logged(), (THREADS * PER_THREAD) as u64);

    let mut per_thread = vec![0usize; THREADS];
    for record in records.iter() {
        assert_eq!(record.last(), Some(&b'\n'));
        let parsed: serde_json::Value =
            serde_json::from_slice(&record[..record.len() - 1]).expect("whole JSON record");
        let thread: usize = parsed["thread"].as_str().unwrap().parse().unwrap();
        per_thread[thread] += 1;
    }
    assert!(per_thread.iter().all(|&n| n == PER_THREAD));
}

#[test]
fn test_concurrent_close_tears_down_once() {
    const CLOSERS: usize = 16;

    let (logger, sink) = counting_logger(OutputFormat::Custom);
    let barrier = Arc::new(Barrier::new(CLOSERS));

    let handles: Vec<_> = (0..CLOSERS)
        .map(|_| {
            let logger = Arc::clone(&logger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                logger.close()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().expect("closer panicked").is_ok());
    }

    assert_eq!(sink.closes.load(Ordering::SeqCst), 1);
    assert_eq!(logger.state(), LoggerState::Closed);

    drop(logger);
    assert_eq!(sink.closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_logging_races_with_close() {
    const WRITERS: usize = 4;

    let (logger, sink) = counting_logger(OutputFormat::Timestamp);
    let barrier = Arc::new(Barrier::new(WRITERS + 1));

    let writers: Vec<_> = (0..WRITERS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..2000 {
                    logger.warn_with("racing", [Field::int("thread", t as i64), Field::int("i", i)]);
                }
            })
        })
        .collect();

    barrier.wait();
    thread::sleep(Duration::from_millis(1));
    logger.close().expect("close succeeds");

    for writer in writers {
        writer.join().expect("writer panicked");
    }

    let metrics = logger.metrics();
    let written = sink.records.lock().len() as u64;
    assert_eq!(written, metrics.total_logged());
    assert_eq!(
        metrics.total_logged() + metrics.dropped_after_close(),
        (WRITERS * 2000) as u64
    );
    assert_eq!(sink.writes_after_close.load(Ordering::SeqCst), 0);
}

#[test]
fn test_concurrent_file_logging() {
    const THREADS: usize = 4;
    const PER_THREAD: usize = 500;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Arc::new(
        Logger::builder()
            .console(false)
            .format(OutputFormat::Default)
            .file(temp_dir.path().to_str().unwrap(), "stress.log")
            .build()
            .expect("valid config"),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.error_with("file stress", [Field::int("thread", t as i64), Field::int("i", i as i64)]);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("logging thread panicked");
    }
    logger.close().expect("close flushes");

    let content = fs::read_to_string(temp_dir.path().join("stress.log")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), THREADS * PER_THREAD);
    assert!(lines.iter().all(|line| line.contains("| ERROR | file stress thread=")));
}

#[test]
fn test_pool_reuse_under_contention() {
    const THREADS: usize = 8;

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            thread::spawn(move || {
                for i in 0..5000 {
                    let field = Field::string("key", format!("{}-{}", t, i));
                    assert_eq!(field.value(), format!("{}-{}", t, i));
                    field.release();

                    let clean = Field::int("n", i);
                    assert_eq!(clean.key(), "n");
                    assert_eq!(clean.value(), i.to_string());
                    clean.release();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("pool thread panicked");
    }
}
