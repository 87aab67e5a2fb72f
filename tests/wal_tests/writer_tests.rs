//! Tests for WAL Writer
//!
//! These tests verify:
//! - Appending records to the WAL
//! - Length tracking and reopen behaviour
//! - Clearing (truncation to zero)
//! - Integration with reader

use std::fs;
use std::path::PathBuf;

use stratakv::codec::encoded_len;
use stratakv::wal::{WalReader, WalWriter};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("wal.log");
    (temp_dir, wal_path)
}

fn read_all(path: &PathBuf) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut reader = WalReader::open(path).unwrap();
    let mut records = Vec::new();
    reader.replay(|k, v| records.push((k, v))).unwrap();
    records
}

// =============================================================================
// Basic Writing Tests
// =============================================================================

#[test]
fn test_open_creates_file() {
    let (_temp, wal_path) = setup_temp_wal();

    let writer = WalWriter::open(&wal_path).unwrap();

    assert!(wal_path.exists());
    assert!(writer.is_empty());
    assert_eq!(writer.path(), wal_path.as_path());
}

#[test]
fn test_append_single_record() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path).unwrap();
    let len = writer.append(b"key1", b"value1").unwrap();

    assert_eq!(len, encoded_len(b"key1", b"value1") as u64);
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), len);
}

#[test]
fn test_append_is_visible_without_close() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path).unwrap();
    writer.append(b"a", b"1").unwrap();
    writer.append(b"b", b"2").unwrap();

    // Writer still open: the bytes must already be in the file
    let records = read_all(&wal_path);
    assert_eq!(
        records,
        vec![(b"a".to_vec(), b"1".to_vec()), (b"b".to_vec(), b"2".to_vec())]
    );
}

#[test]
fn test_append_preserves_call_order() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path).unwrap();
    for i in (0..50).rev() {
        writer
            .append(format!("key{}", i).as_bytes(), format!("val{}", i).as_bytes())
            .unwrap();
    }

    let records = read_all(&wal_path);
    assert_eq!(records.len(), 50);
    assert_eq!(records[0].0, b"key49".to_vec());
    assert_eq!(records[49].0, b"key0".to_vec());
}

#[test]
fn test_reopen_appends_after_existing_records() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let mut writer = WalWriter::open(&wal_path).unwrap();
        writer.append(b"first", b"1").unwrap();
    }

    let mut writer = WalWriter::open(&wal_path).unwrap();
    assert_eq!(writer.len(), encoded_len(b"first", b"1") as u64);
    writer.append(b"second", b"2").unwrap();

    let records = read_all(&wal_path);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].0, b"first".to_vec());
    assert_eq!(records[1].0, b"second".to_vec());
}

// =============================================================================
// Clear Tests
// =============================================================================

#[test]
fn test_clear_empties_file() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path).unwrap();
    writer.append(b"k", b"v").unwrap();
    writer.clear().unwrap();

    assert!(writer.is_empty());
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), 0);
    assert!(read_all(&wal_path).is_empty());
}

#[test]
fn test_append_after_clear() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path).unwrap();
    writer.append(b"old", b"gone").unwrap();
    writer.clear().unwrap();
    writer.append(b"new", b"here").unwrap();

    let records = read_all(&wal_path);
    assert_eq!(records, vec![(b"new".to_vec(), b"here".to_vec())]);
}

#[test]
fn test_len_tracks_file_across_clear() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path).unwrap();
    writer.append(b"old", b"gone").unwrap();
    writer.clear().unwrap();
    assert_eq!(writer.len(), 0);

    let len = writer.append(b"new", b"here").unwrap();
    assert_eq!(len, encoded_len(b"new", b"here") as u64);
    assert_eq!(writer.len(), fs::metadata(&wal_path).unwrap().len());
}

#[test]
fn test_sync_is_harmless() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path).unwrap();
    writer.append(b"k", b"v").unwrap();
    writer.sync().unwrap();

    assert_eq!(read_all(&wal_path).len(), 1);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[cfg(target_os = "linux")]
#[test]
fn test_failed_append_is_rejected_and_length_kept() {
    // Every write to /dev/full fails with ENOSPC
    let mut writer = WalWriter::open(std::path::Path::new("/dev/full")).unwrap();
    let len_before = writer.len();

    let result = writer.append(b"key", b"value");

    assert!(result.is_err());
    assert_eq!(writer.len(), len_before);
    assert!(writer.is_empty());

    // The writer stays usable and keeps failing cleanly
    assert!(writer.append(b"key2", b"value2").is_err());
    assert_eq!(writer.len(), len_before);
}
