use dmap_core::{Dmap, DmapError};
use dmap_storage::{MemoryStorage, SledStorage, Storage};
use dmap_types::{CostSchedule, Entry, Word, Zone};
use proptest::prelude::*;
use tempfile::TempDir;

// Property-based tests for the entry store
// Namespace isolation, key-bit sensitivity and lock monotonicity

fn arbitrary_zone() -> impl Strategy<Value = Zone> {
    prop::array::uniform20(any::<u8>()).prop_map(Zone)
}

fn arbitrary_word() -> impl Strategy<Value = Word> {
    prop::array::uniform32(any::<u8>()).prop_map(Word)
}

fn unlocked_word() -> impl Strategy<Value = Word> {
    arbitrary_word().prop_map(|w| w.with_lock(false))
}

fn flip_bit(word: &Word, bit: usize) -> Word {
    let mut bytes = word.0;
    bytes[bit / 8] ^= 0x80 >> (bit % 8);
    Word(bytes)
}

proptest! {
    #[test]
    fn writes_never_cross_zones(
        a in arbitrary_zone(),
        b in arbitrary_zone(),
        key in arbitrary_word(),
        meta in arbitrary_word(),
        data in arbitrary_word(),
    ) {
        prop_assume!(a != b);
        let dmap = Dmap::new(MemoryStorage::new());
        let before = dmap.get(&b, &key).unwrap();

        dmap.set(&a, &key, meta, data).unwrap();

        prop_assert_eq!(dmap.get(&b, &key).unwrap(), before);
        prop_assert_eq!(dmap.get(&a, &key).unwrap(), Entry::new(meta, data));
    }

    #[test]
    fn every_key_bit_addresses_a_new_entry(
        zone in arbitrary_zone(),
        key in arbitrary_word(),
        bit in 0usize..256,
        data in arbitrary_word(),
    ) {
        let dmap = Dmap::new(MemoryStorage::new());
        dmap.set(&zone, &key, Word::LOCK, data).unwrap();

        let neighbour = flip_bit(&key, bit);
        prop_assert_eq!(dmap.get(&zone, &neighbour).unwrap(), Entry::ZERO);
        prop_assert!(dmap.set(&zone, &neighbour, Word::ZERO, data).is_ok());
    }

    #[test]
    fn lock_is_monotonic(
        zone in arbitrary_zone(),
        key in arbitrary_word(),
        meta in arbitrary_word(),
        data in arbitrary_word(),
        attempts in prop::collection::vec((arbitrary_word(), arbitrary_word()), 1..8),
    ) {
        let dmap = Dmap::new(MemoryStorage::new());
        let locked_meta = meta.with_lock(true);
        dmap.set(&zone, &key, locked_meta, data).unwrap();

        for (m, d) in attempts {
            let err = dmap.set(&zone, &key, m, d).unwrap_err();
            prop_assert!(err.is_locked(), "write after lock returned {:?}", err);
        }
        let again = dmap.set(&zone, &key, locked_meta, data);
        prop_assert!(
            matches!(again, Err(DmapError::Locked { .. })),
            "identical write after lock returned {:?}",
            again
        );
        prop_assert_eq!(dmap.get(&zone, &key).unwrap(), Entry::new(locked_meta, data));
    }

    #[test]
    fn repeated_write_is_cheaper_than_creation(
        zone in arbitrary_zone(),
        key in arbitrary_word(),
        meta in unlocked_word(),
        data in arbitrary_word(),
    ) {
        let schedule = CostSchedule::default();
        let dmap = Dmap::new(MemoryStorage::new());
        dmap.set(&zone, &key, meta, data).unwrap();
        let repeat = dmap.set(&zone, &key, meta, data).unwrap();

        let fresh = Dmap::new(MemoryStorage::new());
        let create = fresh.set(&zone, &key, Word([1u8; 32]), Word([1u8; 32])).unwrap();

        prop_assert_eq!(repeat.cost.unchanged, 2);
        prop_assert!(repeat.cost.units(&schedule) <= create.cost.units(&schedule));
        prop_assert_eq!(dmap.get(&zone, &key).unwrap(), Entry::new(meta, data));
    }
}

#[test]
fn single_bit_keys_are_independent() {
    let zone = Zone([0x5Au8; 20]);
    let base = Word([0xFFu8; 32]);
    let keys = [base, flip_bit(&base, 0), flip_bit(&base, 255), flip_bit(&base, 128)];
    let dmap = Dmap::new(MemoryStorage::new());

    for (i, key) in keys.iter().enumerate() {
        dmap.set(&zone, key, Word::LOCK, Word([i as u8 + 1; 32])).unwrap();
    }
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(
            dmap.get(&zone, key).unwrap(),
            Entry::new(Word::LOCK, Word([i as u8 + 1; 32]))
        );
    }
}

#[test]
fn concrete_lock_scenario() {
    let zone = Zone([0xC0u8; 20]);
    let key = Word::from_label("K").unwrap();
    let dmap = Dmap::new(MemoryStorage::new());

    dmap.set(&zone, &key, Word::LOCK, Word::ZERO).unwrap();
    assert_eq!(dmap.get(&zone, &key).unwrap(), Entry::new(Word::LOCK, Word::ZERO));

    let err = dmap.set(&zone, &key, Word::ZERO, Word::ZERO).unwrap_err();
    assert!(err.is_locked());
    assert_eq!(dmap.get(&zone, &key).unwrap(), Entry::new(Word::LOCK, Word::ZERO));
}

#[test]
fn sled_backed_entries_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let zone = Zone([0x01u8; 20]);
    let key = Word::from_label("persist").unwrap();

    {
        let dmap = Dmap::genesis(SledStorage::new(temp_dir.path()).unwrap(), zone).unwrap();
        dmap.set(&zone, &key, Word::LOCK, Word([9u8; 32])).unwrap();
        dmap.storage().flush().unwrap();
    }

    let dmap = Dmap::new(SledStorage::new(temp_dir.path()).unwrap());
    assert_eq!(
        dmap.get(&zone, &key).unwrap(),
        Entry::new(Word::LOCK, Word([9u8; 32]))
    );
    assert!(dmap.set(&zone, &key, Word::ZERO, Word::ZERO).unwrap_err().is_locked());
    assert_eq!(Zone::from_pointer(&dmap.root().unwrap().data), zone);
}
