//! Per-call write overlay.
//!
//! A [`Journal`] buffers every write of one ledger call and remembers the
//! value each touched slot held when the call began. Committing applies all
//! buffered writes in one atomic batch; dropping the journal discards them,
//! so a failed call leaves storage exactly as it found it.

use crate::Storage;
use anyhow::Result;
use dmap_types::{Cost, Slot, Word};
use std::collections::{BTreeMap, HashMap};

pub struct Journal<'a, S: Storage + ?Sized> {
    storage: &'a S,
    /// Value of each touched slot at the start of the call.
    original: HashMap<Slot, Word>,
    /// Buffered writes, ordered so the committed batch is deterministic.
    pending: BTreeMap<Slot, Word>,
    reads: u64,
}

impl<'a, S: Storage + ?Sized> Journal<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self {
            storage,
            original: HashMap::new(),
            pending: BTreeMap::new(),
            reads: 0,
        }
    }

    /// Read a slot, observing this call's own buffered writes.
    pub fn load(&mut self, slot: &Slot) -> Result<Word> {
        self.reads += 1;
        if let Some(word) = self.pending.get(slot) {
            return Ok(*word);
        }
        self.original_value(slot)
    }

    /// Buffer a write.
    pub fn store(&mut self, slot: Slot, value: Word) -> Result<()> {
        self.original_value(&slot)?;
        self.pending.insert(slot, value);
        Ok(())
    }

    /// Tally of the call so far.
    pub fn cost(&self) -> Cost {
        let mut cost = Cost {
            reads: self.reads,
            ..Default::default()
        };
        for (slot, current) in &self.pending {
            let original = self.original.get(slot).copied().unwrap_or(Word::ZERO);
            cost.record_write(&original, current);
        }
        cost
    }

    /// Apply every write that changed a slot, atomically, and return the
    /// call's cost.
    pub fn commit(self) -> Result<Cost> {
        let cost = self.cost();
        let writes: Vec<(Slot, Word)> = self
            .pending
            .iter()
            .filter(|(slot, word)| self.original.get(*slot) != Some(*word))
            .map(|(slot, word)| (*slot, *word))
            .collect();
        if !writes.is_empty() {
            self.storage.apply(&writes)?;
        }
        Ok(cost)
    }

    fn original_value(&mut self, slot: &Slot) -> Result<Word> {
        if let Some(word) = self.original.get(slot) {
            return Ok(*word);
        }
        let word = self.storage.load(slot)?;
        self.original.insert(*slot, word);
        Ok(word)
    }
}
