//! Tests for FileReader
//!
//! These tests verify:
//! - Decoding files onto the bus
//! - Bus closure on success, failure and cancellation
//! - Partial record policies and ttl forwarding
//! - Progress hooks and silent mode

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use kvframe::bus;
use kvframe::codec::DELIMITER;
use kvframe::progress::{Progress, Side, Summary};
use kvframe::{CancelToken, Config, FileReader, KvError, PartialRecordPolicy, Record};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_file(fields: &[&str]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("dump.kv");
    let mut bytes = Vec::new();
    for field in fields {
        bytes.extend_from_slice(field.as_bytes());
        bytes.extend_from_slice(DELIMITER);
    }
    fs::write(&path, bytes).unwrap();
    (temp_dir, path)
}

#[derive(Default)]
struct Counting {
    reads: AtomicU64,
    completions: AtomicU64,
    failures: AtomicU64,
}

impl Progress for Counting {
    fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    fn completed(&self, summary: Summary<'_>) {
        assert!(matches!(summary, Summary::Read(_)));
        self.completions.fetch_add(1, Ordering::SeqCst);
    }

    fn failed(&self, side: Side, _error: &KvError) {
        assert_eq!(side, Side::Read);
        self.failures.fetch_add(1, Ordering::SeqCst);
    }
}

/// Run a reader to completion with an unbounded drain on this thread
fn read_all(path: &PathBuf, config: &Config) -> (kvframe::Result<kvframe::file::ReadSummary>, Vec<Record>) {
    let cancel = CancelToken::new();
    let (publisher, mut subscriber) = bus::bounded(config.bus_capacity);
    let reader = FileReader::new(path, publisher, config, cancel.clone());

    let handle = thread::spawn(move || reader.run());

    let mut records = Vec::new();
    while let Some(batch) = subscriber.consume(&cancel).unwrap() {
        assert_eq!(batch.len(), 1);
        records.extend(batch);
    }
    (handle.join().unwrap(), records)
}

// =============================================================================
// Basic Reading Tests
// =============================================================================

#[test]
fn test_read_records() {
    let (_temp, path) = setup_temp_file(&["a", "b", "", "c", "d", "5"]);

    let (result, records) = read_all(&path, &Config::default());
    let summary = result.unwrap();

    assert_eq!(records, vec![Record::new("a", "b", ""), Record::new("c", "d", "5")]);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.tokens, 6);
    assert_eq!(summary.partial_records, 0);
}

#[test]
fn test_read_empty_file_closes_bus() {
    let (_temp, path) = setup_temp_file(&[]);

    let (result, records) = read_all(&path, &Config::default());

    assert_eq!(result.unwrap().records, 0);
    assert!(records.is_empty());
}

#[test]
fn test_missing_file_is_io_error_and_closes_bus() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.kv");

    let (result, records) = read_all(&path, &Config::default());

    assert!(matches!(result, Err(KvError::Io(_))));
    assert!(records.is_empty());
}

#[test]
fn test_read_failure_after_open_is_io_error_and_closes_bus() {
    // Opening a directory succeeds; reading it fails
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().to_path_buf();

    let (result, records) = read_all(&path, &Config::default());

    assert!(matches!(result, Err(KvError::Io(_))));
    assert!(records.is_empty());
}

#[test]
fn test_unterminated_tail_reported() {
    let (_temp, path) = setup_temp_file(&["k", "v", "t"]);
    let mut bytes = fs::read(&path).unwrap();
    bytes.extend_from_slice(b"dangling");
    fs::write(&path, bytes).unwrap();

    let (result, records) = read_all(&path, &Config::default());
    let summary = result.unwrap();

    assert_eq!(records, vec![Record::new("k", "v", "t")]);
    assert_eq!(summary.discarded_bytes, 8);
}

// =============================================================================
// Partial Records
// =============================================================================

#[test]
fn test_partial_record_padded_and_published() {
    let (_temp, path) = setup_temp_file(&["k1", "v1", "t1", "k2", "v2"]);

    let (result, records) = read_all(&path, &Config::default());
    let summary = result.unwrap();

    assert_eq!(records, vec![Record::new("k1", "v1", "t1"), Record::new("k2", "v2", "")]);
    assert_eq!(summary.partial_records, 1);
}

#[test]
fn test_partial_record_rejected_in_strict_mode() {
    let (_temp, path) = setup_temp_file(&["k1", "v1", "t1", "k2"]);
    let config = Config::builder()
        .partial_record(PartialRecordPolicy::Reject)
        .build()
        .unwrap();

    let (result, records) = read_all(&path, &config);

    assert!(matches!(result, Err(KvError::TruncatedRecord { tokens: 1 })));
    assert_eq!(records, vec![Record::new("k1", "v1", "t1")]);
}

// =============================================================================
// TTL Forwarding
// =============================================================================

#[test]
fn test_ttl_dropped_when_not_forwarded() {
    let (_temp, path) = setup_temp_file(&["k", "v", "3600"]);
    let config = Config::builder().forward_ttl(false).build().unwrap();

    let (result, records) = read_all(&path, &config);

    result.unwrap();
    assert_eq!(records, vec![Record::new("k", "v", "")]);
}

// =============================================================================
// Cancellation
// =============================================================================

#[test]
fn test_cancel_while_blocked_on_publish() {
    let (_temp, path) = setup_temp_file(&["a", "1", "", "b", "2", "", "c", "3", ""]);
    let cancel = CancelToken::new();
    let (publisher, mut subscriber) = bus::bounded(1);
    let reader = FileReader::new(&path, publisher, &Config::default(), cancel.clone());

    let handle = thread::spawn(move || reader.run());

    // Nobody consumes, so the reader fills the bus and blocks
    thread::sleep(Duration::from_millis(50));
    let start = Instant::now();
    cancel.cancel();
    let result = handle.join().unwrap();

    assert!(matches!(result, Err(KvError::Cancelled)));
    assert!(start.elapsed() < Duration::from_secs(5));

    // The bus was closed: what was queued drains, then the sentinel
    let drain = CancelToken::new();
    assert_eq!(subscriber.consume(&drain).unwrap(), Some(vec![Record::new("a", "1", "")]));
    assert_eq!(subscriber.consume(&drain).unwrap(), None);
}

#[test]
fn test_cancel_before_start() {
    let (_temp, path) = setup_temp_file(&["a", "1", ""]);
    let cancel = CancelToken::new();
    cancel.cancel();
    let (publisher, mut subscriber) = bus::bounded(1);

    let result = FileReader::new(&path, publisher, &Config::default(), cancel).run();

    assert!(result.unwrap_err().is_cancelled());
    assert_eq!(subscriber.consume(&CancelToken::new()).unwrap(), None);
}

// =============================================================================
// Progress
// =============================================================================

#[test]
fn test_progress_hooks() {
    let (_temp, path) = setup_temp_file(&["a", "1", "", "b", "2", ""]);
    let progress = Arc::new(Counting::default());
    let cancel = CancelToken::new();
    let (publisher, mut subscriber) = bus::bounded(4);

    FileReader::new(&path, publisher, &Config::default(), cancel.clone())
        .with_progress(progress.clone())
        .run()
        .unwrap();
    while subscriber.consume(&cancel).unwrap().is_some() {}

    assert_eq!(progress.reads.load(Ordering::SeqCst), 2);
    assert_eq!(progress.completions.load(Ordering::SeqCst), 1);
    assert_eq!(progress.failures.load(Ordering::SeqCst), 0);
}

#[test]
fn test_silent_mode_suppresses_markers_only() {
    let (_temp, path) = setup_temp_file(&["a", "1", ""]);
    let progress = Arc::new(Counting::default());
    let config = Config::builder().silent(true).bus_capacity(4).build().unwrap();
    let (publisher, _subscriber) = bus::bounded(4);

    FileReader::new(&path, publisher, &config, CancelToken::new())
        .with_progress(progress.clone())
        .run()
        .unwrap();

    assert_eq!(progress.reads.load(Ordering::SeqCst), 0);
    assert_eq!(progress.completions.load(Ordering::SeqCst), 1);
}
