//! Tests for WAL Reader
//!
//! These tests verify:
//! - Reading entries back in write order
//! - End-of-stream signalling
//! - Reading while the writer keeps appending
//! - Torn record handling

use std::fs::OpenOptions;
use std::io::Cursor;

use averagedb::config::WalSyncStrategy;
use averagedb::storage::{FileBackend, MemoryBackend, StorageBackend};
use averagedb::wal::{WalReader, WalWriter, WriteOperation};
use averagedb::DbError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn sample_entries() -> Vec<WriteOperation> {
    vec![
        WriteOperation::put(b"k1".to_vec(), b"v1".to_vec(), 1),
        WriteOperation::put(b"k2".to_vec(), b"v2".to_vec(), 2),
        WriteOperation::delete(b"k1".to_vec(), 3),
        WriteOperation::put(b"k3".to_vec(), Vec::new(), 4),
    ]
}

fn write_entries(writer: &mut WalWriter, entries: &[WriteOperation]) {
    for entry in entries {
        writer.append(entry).unwrap();
    }
}

// =============================================================================
// Basic Reading Tests
// =============================================================================

#[test]
fn test_read_empty_stream() {
    let backend = MemoryBackend::new();
    let writer = WalWriter::new(backend.open_stream("wal", "0").unwrap(), WalSyncStrategy::EveryWrite);

    let mut reader = writer.reader().unwrap();
    let err = reader.read().unwrap_err();

    assert!(err.is_end_of_stream());
}

#[test]
fn test_read_single_entry() {
    let backend = MemoryBackend::new();
    let mut writer = WalWriter::new(backend.open_stream("wal", "0").unwrap(), WalSyncStrategy::EveryWrite);
    let mut reader = writer.reader().unwrap();

    let original = WriteOperation::put(b"hi".to_vec(), b"value".to_vec(), 99);
    writer.append(&original).unwrap();

    assert_eq!(reader.read().unwrap(), original);
    assert!(matches!(reader.read(), Err(DbError::EndOfStream)));
}

#[test]
fn test_read_multiple_entries_in_order() {
    let backend = MemoryBackend::new();
    let mut writer = WalWriter::new(backend.open_stream("wal", "0").unwrap(), WalSyncStrategy::EveryWrite);
    let entries = sample_entries();
    write_entries(&mut writer, &entries);

    let mut reader = writer.reader().unwrap();
    for (i, original) in entries.iter().enumerate() {
        let entry = reader.read().unwrap();
        assert_eq!(&entry, original, "Entry {} mismatch", i);
    }

    // Should reach end of stream, repeatedly
    assert!(reader.read().unwrap_err().is_end_of_stream());
    assert!(reader.read().unwrap_err().is_end_of_stream());
    assert_eq!(reader.records_read(), entries.len() as u64);
}

#[test]
fn test_interleaved_write_and_read() {
    let backend = MemoryBackend::new();
    let mut writer = WalWriter::new(backend.open_stream("wal", "0").unwrap(), WalSyncStrategy::EveryWrite);
    let mut reader = writer.reader().unwrap();

    writer.append(&WriteOperation::put(b"hi".to_vec(), b"value".to_vec(), 1)).unwrap();
    reader.read().unwrap();

    assert!(reader.read().unwrap_err().is_end_of_stream());

    writer.append(&WriteOperation::put(b"hi2".to_vec(), b"value2".to_vec(), 2)).unwrap();
    let entry = reader.read().unwrap();
    assert_eq!(entry.key(), b"hi2");
    assert_eq!(entry.value(), Some(&b"value2"[..]));
}

// =============================================================================
// Iterator Tests
// =============================================================================

#[test]
fn test_iterator_empty_stream() {
    let reader = WalReader::new(Box::new(Cursor::new(Vec::new())));
    let entries: Vec<_> = reader.collect();

    assert!(entries.is_empty());
}

#[test]
fn test_iterator_yields_all_entries() {
    let backend = MemoryBackend::new();
    let mut writer = WalWriter::new(backend.open_stream("wal", "0").unwrap(), WalSyncStrategy::EveryWrite);
    let entries = sample_entries();
    write_entries(&mut writer, &entries);

    let replayed: Vec<WriteOperation> = writer
        .reader()
        .unwrap()
        .collect::<averagedb::Result<_>>()
        .unwrap();

    assert_eq!(replayed, entries);
}

#[test]
fn test_iterator_stops_after_torn_record() {
    let backend = MemoryBackend::new();
    let mut writer = WalWriter::new(backend.open_stream("wal", "0").unwrap(), WalSyncStrategy::EveryWrite);
    write_entries(&mut writer, &sample_entries());

    // Chop the last record short
    let mut bytes = backend.stream_bytes("wal", "0").unwrap();
    bytes.truncate(bytes.len() - 3);

    let mut reader = WalReader::new(Box::new(Cursor::new(bytes)));
    let results: Vec<_> = reader.by_ref().collect();

    assert_eq!(results.len(), 4);
    assert!(results[..3].iter().all(Result::is_ok));
    assert!(matches!(results[3], Err(DbError::Serialization(_))));
    assert!(reader.next().is_none());
}

// =============================================================================
// File Backend Tests
// =============================================================================

#[test]
fn test_file_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FileBackend::open(temp_dir.path()).unwrap();
    let mut writer = WalWriter::new(backend.open_stream("wal", "0").unwrap(), WalSyncStrategy::EveryWrite);

    let entries: Vec<WriteOperation> = (0..100)
        .map(|i| {
            WriteOperation::put(
                format!("key{}", i).into_bytes(),
                format!("val{}", i).into_bytes(),
                i,
            )
        })
        .collect();
    write_entries(&mut writer, &entries);

    let mut reader = writer.reader().unwrap();
    for original in &entries {
        assert_eq!(&reader.read().unwrap(), original);
    }
    assert!(reader.read().unwrap_err().is_end_of_stream());
}

#[test]
fn test_file_torn_tail_is_not_end_of_stream() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FileBackend::open(temp_dir.path()).unwrap();
    let mut writer = WalWriter::new(backend.open_stream("wal", "0").unwrap(), WalSyncStrategy::EveryWrite);
    writer.append(&WriteOperation::put(b"key".to_vec(), b"value".to_vec(), 1)).unwrap();

    // Simulate a crash mid-write
    let path = backend.stream_path("wal", "0");
    let len = std::fs::metadata(&path).unwrap().len();
    let file = OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(len - 2).unwrap();

    let mut reader = writer.reader().unwrap();
    let err = reader.read().unwrap_err();
    assert!(!err.is_end_of_stream());
    assert!(matches!(err, DbError::Serialization(_)));
}
