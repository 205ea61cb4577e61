//! Tests for WAL entries
//!
//! These tests verify:
//! - Put and tombstone construction
//! - Encoded size (key + value only)
//! - Timestamp source

use averagedb::wal::{now_nanos, Operation, WriteOperation};

#[test]
fn test_put_entry_fields() {
    let op = WriteOperation::put(b"hi".to_vec(), b"value".to_vec(), 42);

    assert_eq!(op.key(), b"hi");
    assert_eq!(op.value(), Some(&b"value"[..]));
    assert_eq!(op.operation(), &Operation::Value(b"value".to_vec()));
    assert_eq!(op.timestamp(), 42);
    assert!(!op.is_delete());
}

#[test]
fn test_delete_entry_fields() {
    let op = WriteOperation::delete(b"hi".to_vec(), 7);

    assert_eq!(op.key(), b"hi");
    assert_eq!(op.value(), None);
    assert_eq!(op.operation(), &Operation::Tombstone);
    assert!(op.is_delete());
}

#[test]
fn test_encoded_size_ignores_timestamp() {
    let early = WriteOperation::put(b"key".to_vec(), b"value".to_vec(), 0);
    let late = WriteOperation::put(b"key".to_vec(), b"value".to_vec(), i64::MAX);

    assert_eq!(early.encoded_size(), 8);
    assert_eq!(late.encoded_size(), 8);
}

#[test]
fn test_encoded_size_of_tombstone() {
    let op = WriteOperation::new(b"key".to_vec(), Operation::Tombstone, 1);
    assert_eq!(op.encoded_size(), 3);
    assert_eq!(Operation::Tombstone.value_len(), 0);
}

#[test]
fn test_now_nanos_is_positive() {
    let a = now_nanos();
    let b = now_nanos();
    assert!(a > 0);
    assert!(b >= a);
}
