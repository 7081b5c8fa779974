//! Resource accounting for ledger calls.
//!
//! Costs are observed per word, classified by how each word's value moved
//! between the start and the end of a call. Pricing the classes is the host
//! ledger's business; [`CostSchedule`] only carries its parameters.

use crate::word::Word;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Word-level tally of a single call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    /// Words read from storage.
    pub reads: u64,
    /// Writes that left the word at its original value (including 0 -> 0).
    pub unchanged: u64,
    /// Writes that moved a word from zero to non-zero.
    pub created: u64,
    /// Writes that moved a word between two different non-zero values.
    pub updated: u64,
    /// Writes that moved a word from non-zero to zero.
    pub cleared: u64,
}

impl Cost {
    /// Classify a write by the word's value at the start of the call and
    /// the value it ends with.
    pub fn record_write(&mut self, original: &Word, current: &Word) {
        if original == current {
            self.unchanged += 1;
        } else if original.is_zero() {
            self.created += 1;
        } else if current.is_zero() {
            self.cleared += 1;
        } else {
            self.updated += 1;
        }
    }

    pub fn record_read(&mut self) {
        self.reads += 1;
    }

    /// Total number of word writes.
    pub fn writes(&self) -> u64 {
        self.unchanged + self.created + self.updated + self.cleared
    }

    /// Price the tally under a schedule.
    pub fn units(&self, schedule: &CostSchedule) -> u64 {
        self.reads * schedule.read
            + self.unchanged * schedule.unchanged_write
            + self.created * schedule.create_write
            + self.updated * schedule.update_write
            + self.cleared * schedule.clear_write
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(mut self, rhs: Cost) -> Cost {
        self += rhs;
        self
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, rhs: Cost) {
        self.reads += rhs.reads;
        self.unchanged += rhs.unchanged;
        self.created += rhs.created;
        self.updated += rhs.updated;
        self.cleared += rhs.cleared;
    }
}

/// Unit price per word class, as set by the host ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostSchedule {
    pub read: u64,
    pub unchanged_write: u64,
    pub create_write: u64,
    pub update_write: u64,
    pub clear_write: u64,
}

impl Default for CostSchedule {
    fn default() -> Self {
        Self {
            read: 800,
            unchanged_write: 100,
            create_write: 20_000,
            update_write: 2_900,
            clear_write: 2_900,
        }
    }
}
