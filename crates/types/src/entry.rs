use crate::word::{Word, WORD_BYTES};
use serde::{Deserialize, Serialize};

/// The `(meta, data)` pair stored for every (zone, key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Entry {
    pub meta: Word,
    pub data: Word,
}

impl Entry {
    /// Value of every entry that was never written.
    pub const ZERO: Entry = Entry {
        meta: Word::ZERO,
        data: Word::ZERO,
    };

    pub fn new(meta: Word, data: Word) -> Self {
        Self { meta, data }
    }

    /// Whether further writes to this entry are forbidden.
    pub fn is_locked(&self) -> bool {
        self.meta.is_locked()
    }
}

/// 256-bit storage address inside the ledger.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Slot(pub [u8; WORD_BYTES]);

impl Slot {
    /// Slot at a small fixed index, for reserved cells such as the root entry.
    pub fn from_index(index: u64) -> Self {
        let mut bytes = [0u8; WORD_BYTES];
        bytes[WORD_BYTES - 8..].copy_from_slice(&index.to_be_bytes());
        Slot(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; WORD_BYTES] {
        &self.0
    }

    /// Big-endian wrapping addition modulo 2^256.
    pub fn offset(&self, delta: u64) -> Slot {
        let mut bytes = self.0;
        let mut carry = delta as u128;
        for byte in bytes.iter_mut().rev() {
            if carry == 0 {
                break;
            }
            let sum = *byte as u128 + (carry & 0xFF);
            *byte = sum as u8;
            carry = (carry >> 8) + (sum >> 8);
        }
        Slot(bytes)
    }
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Slot(0x{})", hex::encode(self.0))
    }
}

impl From<[u8; WORD_BYTES]> for Slot {
    fn from(value: [u8; WORD_BYTES]) -> Self {
        Slot(value)
    }
}
