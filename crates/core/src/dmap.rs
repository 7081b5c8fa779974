//! Entry store
//!
//! Every zone owns 2^256 independent `(meta, data)` entries. A zone can only
//! write its own entries, and an entry whose `meta` has the lock bit set can
//! never be written again.

use crate::errors::*;
use dmap_crypto::entry_slots;
use dmap_storage::{Journal, Storage};
use dmap_types::{Cost, Entry, Key, Notification, Receipt, Slot, Word, Zone};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// Reserved slot of the root entry's `meta` word.
pub const ROOT_META_SLOT: u64 = 0;
/// Reserved slot of the root entry's `data` word.
pub const ROOT_DATA_SLOT: u64 = 1;

/// The dmap entry store over an injected slot storage.
pub struct Dmap<S: Storage> {
    storage: S,
    /// Serializes mutating calls so each one observes and commits a
    /// consistent view.
    serial: Mutex<()>,
}

impl<S: Storage> Dmap<S> {
    /// Wrap a storage without touching it.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            serial: Mutex::new(()),
        }
    }

    /// Wrap a storage and make sure its root entry points at `root`.
    ///
    /// The root entry is written once, locked; later calls leave an
    /// existing root alone.
    pub fn genesis(storage: S, root: Zone) -> Result<Self> {
        let dmap = Self::new(storage);
        dmap.initialize_root(root)?;
        Ok(dmap)
    }

    fn initialize_root(&self, root: Zone) -> Result<()> {
        let _guard = self.serial.lock();
        let meta_slot = Slot::from_index(ROOT_META_SLOT);
        let data_slot = Slot::from_index(ROOT_DATA_SLOT);

        let mut journal = Journal::new(&self.storage);
        if journal.load(&meta_slot)?.is_locked() {
            debug!("dmap root already initialized");
            return Ok(());
        }
        journal.store(meta_slot, Word::LOCK)?;
        journal.store(data_slot, root.to_pointer())?;
        journal.commit()?;

        info!(%root, "initialized dmap root");
        Ok(())
    }

    /// The root entry written at genesis (zero if never initialized).
    pub fn root(&self) -> Result<Entry> {
        Ok(Entry::new(
            self.storage.load(&Slot::from_index(ROOT_META_SLOT))?,
            self.storage.load(&Slot::from_index(ROOT_DATA_SLOT))?,
        ))
    }

    /// Read the entry stored under `(zone, key)`.
    pub fn get(&self, zone: &Zone, key: &Key) -> Result<Entry> {
        Ok(self.get_metered(zone, key)?.0)
    }

    /// Read the entry stored under `(zone, key)` together with the cost of
    /// the read: one read per word.
    pub fn get_metered(&self, zone: &Zone, key: &Key) -> Result<(Entry, Cost)> {
        let (meta_slot, data_slot) = entry_slots(zone, key);
        let mut cost = Cost::default();
        let meta = self.storage.load(&meta_slot)?;
        cost.record_read();
        let data = self.storage.load(&data_slot)?;
        cost.record_read();
        Ok((Entry::new(meta, data), cost))
    }

    /// Write `(meta, data)` under `(caller, key)`.
    ///
    /// Fails with [`DmapError::Locked`] if the stored `meta` already has the
    /// lock bit set, whatever the new values are. Both words are always
    /// written, so a new `meta` may itself lock the entry.
    pub fn set(&self, caller: &Zone, key: &Key, meta: Word, data: Word) -> Result<Receipt> {
        let _guard = self.serial.lock();
        let (meta_slot, data_slot) = entry_slots(caller, key);

        let mut journal = Journal::new(&self.storage);
        if journal.load(&meta_slot)?.is_locked() {
            warn!(zone = %caller, %key, "rejected write to locked entry");
            return Err(DmapError::Locked {
                zone: *caller,
                key: *key,
            });
        }
        journal.store(meta_slot, meta)?;
        journal.store(data_slot, data)?;
        let cost = journal.commit()?;

        debug!(
            zone = %caller,
            %key,
            locked = meta.is_locked(),
            writes = cost.writes(),
            created = cost.created,
            "entry written"
        );
        Ok(Receipt::new(
            vec![Notification::Set {
                zone: *caller,
                key: *key,
                meta,
                data,
            }],
            cost,
        ))
    }

    /// Underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}
