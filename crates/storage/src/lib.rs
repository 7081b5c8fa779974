use anyhow::Result;
use dmap_types::{Slot, Word, WORD_BYTES};
use parking_lot::RwLock;
use sled::{Db, Tree};
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub mod journal;

pub use journal::Journal;

/// Storage errors
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
    #[error("Corrupt word at {slot:?}: expected 32 bytes, found {len}")]
    CorruptWord { slot: Slot, len: usize },
}

/// Attempts made while another handle is still releasing the file lock.
const OPEN_ATTEMPTS: u32 = 50;
const OPEN_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Open (or create) the sled database at `path`.
///
/// sled releases its file lock in the background after the last handle is
/// dropped, so an immediate reopen may see `WouldBlock`; those opens are
/// retried for about a second.
pub fn open_db<P: AsRef<Path>>(path: P) -> std::result::Result<Db, StorageError> {
    let path = path.as_ref();
    let mut attempt = 1;
    loop {
        match sled::open(path) {
            Err(sled::Error::Io(e)) if is_lock_contention(&e) && attempt < OPEN_ATTEMPTS => {
                tracing::debug!(
                    path = %path.display(),
                    attempt,
                    "database still locked, retrying"
                );
                attempt += 1;
                thread::sleep(OPEN_RETRY_DELAY);
            }
            result => return Ok(result?),
        }
    }
}

fn is_lock_contention(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock || e.to_string().contains("could not acquire lock")
}

/// Abstract storage trait
///
/// A flat map of 256-bit slots to 256-bit words. Unwritten slots read as
/// zero, and writing zero is indistinguishable from never writing.
pub trait Storage: Send + Sync {
    /// Read the word stored at `slot`.
    fn load(&self, slot: &Slot) -> Result<Word>;

    /// Write every `(slot, word)` pair, all or nothing.
    fn apply(&self, writes: &[(Slot, Word)]) -> Result<()>;

    fn store(&self, slot: &Slot, value: Word) -> Result<()> {
        self.apply(&[(*slot, value)])
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn load(&self, slot: &Slot) -> Result<Word> {
        (**self).load(slot)
    }

    fn apply(&self, writes: &[(Slot, Word)]) -> Result<()> {
        (**self).apply(writes)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

/// Sled-backed implementation
pub struct SledStorage {
    db: Db,
    slots: Tree,
}

impl SledStorage {
    /// Open (or create) a database at `path` using the default `slots` tree.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = open_db(path)?;
        Self::open_tree(&db, "slots")
    }

    /// Use a named tree of an already open database, so that several
    /// components can keep separate slot spaces in one file.
    pub fn open_tree(db: &Db, name: &str) -> Result<Self> {
        let slots = db.open_tree(name)?;
        Ok(Self {
            db: db.clone(),
            slots,
        })
    }

    /// Number of non-zero slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Storage for SledStorage {
    fn load(&self, slot: &Slot) -> Result<Word> {
        let Some(raw) = self.slots.get(slot.as_bytes())? else {
            return Ok(Word::ZERO);
        };
        let bytes: [u8; WORD_BYTES] =
            raw.as_ref().try_into().map_err(|_| StorageError::CorruptWord {
                slot: *slot,
                len: raw.len(),
            })?;
        Ok(Word(bytes))
    }

    fn apply(&self, writes: &[(Slot, Word)]) -> Result<()> {
        let mut batch = sled::Batch::default();
        for (slot, word) in writes {
            if word.is_zero() {
                batch.remove(&slot.as_bytes()[..]);
            } else {
                batch.insert(&slot.as_bytes()[..], &word.as_bytes()[..]);
            }
        }
        self.slots.apply_batch(batch)?;
        tracing::trace!(writes = writes.len(), "applied slot batch");
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

/// In-memory testing backend
#[derive(Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<RwLock<HashMap<Slot, Word>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-zero slots.
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, slot: &Slot) -> Result<Word> {
        Ok(self.slots.read().get(slot).copied().unwrap_or(Word::ZERO))
    }

    fn apply(&self, writes: &[(Slot, Word)]) -> Result<()> {
        let mut slots = self.slots.write();
        for (slot, word) in writes {
            if word.is_zero() {
                slots.remove(slot);
            } else {
                slots.insert(*slot, *word);
            }
        }
        Ok(())
    }
}
