//! Integration tests for storage backends (Sled and in-memory).
//! Tests slot reads and writes, zero elision, persistence across reopen and
//! journal commit/rollback on both backends.

use dmap_storage::{open_db, Journal, MemoryStorage, SledStorage, Storage, StorageError};
use dmap_types::{Slot, Word};
use tempfile::TempDir;

/// Helper to build a recognisable word
fn word(byte: u8) -> Word {
    Word([byte; 32])
}

fn exercise_backend<S: Storage>(storage: &S) {
    let slot = Slot::from_index(42);
    assert_eq!(storage.load(&slot).unwrap(), Word::ZERO);

    storage.store(&slot, word(7)).unwrap();
    assert_eq!(storage.load(&slot).unwrap(), word(7));

    storage.store(&slot, Word::ZERO).unwrap();
    assert_eq!(storage.load(&slot).unwrap(), Word::ZERO);

    storage
        .apply(&[(Slot::from_index(1), word(1)), (Slot::from_index(2), word(2))])
        .unwrap();
    assert_eq!(storage.load(&Slot::from_index(1)).unwrap(), word(1));
    assert_eq!(storage.load(&Slot::from_index(2)).unwrap(), word(2));
}

#[test]
fn test_memory_backend_semantics() {
    let storage = MemoryStorage::new();
    exercise_backend(&storage);
    assert_eq!(storage.len(), 2);
}

#[test]
fn test_sled_backend_semantics() {
    let temp_dir = TempDir::new().unwrap();
    let storage = SledStorage::new(temp_dir.path()).unwrap();
    exercise_backend(&storage);
    assert_eq!(storage.len(), 2);
}

#[test]
fn test_sled_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let slot = Slot::from_index(3);

    {
        let storage = SledStorage::new(temp_dir.path()).unwrap();
        storage.store(&slot, word(9)).unwrap();
        storage.flush().unwrap();
    }

    let storage = SledStorage::new(temp_dir.path()).unwrap();
    assert_eq!(storage.load(&slot).unwrap(), word(9));
}

#[test]
fn test_back_to_back_reopens() {
    let temp_dir = TempDir::new().unwrap();
    let slot = Slot::from_index(5);

    for round in 1..=10u8 {
        let storage = SledStorage::new(temp_dir.path()).unwrap();
        assert_eq!(storage.load(&slot).unwrap(), word(round - 1));
        storage.store(&slot, word(round)).unwrap();
        storage.flush().unwrap();
    }
}

#[test]
fn test_open_db_reports_database_errors() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("not-a-dir");
    std::fs::write(&file, b"occupied").unwrap();

    assert!(matches!(open_db(&file), Err(StorageError::Database(_))));
}

#[test]
fn test_sled_named_trees_are_disjoint() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_db(temp_dir.path()).unwrap();
    let left = SledStorage::open_tree(&db, "left").unwrap();
    let right = SledStorage::open_tree(&db, "right").unwrap();
    let slot = Slot::from_index(1);

    left.store(&slot, word(1)).unwrap();
    assert_eq!(right.load(&slot).unwrap(), Word::ZERO);
}

#[test]
fn test_journal_commit_on_sled() {
    let temp_dir = TempDir::new().unwrap();
    let storage = SledStorage::new(temp_dir.path()).unwrap();

    let mut journal = Journal::new(&storage);
    journal.store(Slot::from_index(1), word(1)).unwrap();
    journal.store(Slot::from_index(2), word(2)).unwrap();
    assert!(storage.is_empty());

    let cost = journal.commit().unwrap();
    assert_eq!(cost.created, 2);
    assert_eq!(storage.load(&Slot::from_index(1)).unwrap(), word(1));
    assert_eq!(storage.load(&Slot::from_index(2)).unwrap(), word(2));
}

#[test]
fn test_journal_rollback_on_sled() {
    let temp_dir = TempDir::new().unwrap();
    let storage = SledStorage::new(temp_dir.path()).unwrap();
    storage.store(&Slot::from_index(1), word(1)).unwrap();

    {
        let mut journal = Journal::new(&storage);
        journal.store(Slot::from_index(1), word(5)).unwrap();
        journal.store(Slot::from_index(2), word(6)).unwrap();
    }

    assert_eq!(storage.load(&Slot::from_index(1)).unwrap(), word(1));
    assert_eq!(storage.load(&Slot::from_index(2)).unwrap(), Word::ZERO);
}

#[test]
fn test_shared_memory_handle_sees_writes() {
    let storage = MemoryStorage::new();
    let handle = storage.clone();
    storage.store(&Slot::from_index(8), word(8)).unwrap();
    assert_eq!(handle.load(&Slot::from_index(8)).unwrap(), word(8));
}
