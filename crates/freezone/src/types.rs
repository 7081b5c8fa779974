//! Types for the freezone registry

use dmap_crypto::keccak256;
use dmap_types::{Slot, Word, Zone, WORD_BYTES};

/// Storage index of the controller map.
pub const CONTROLLERS_INDEX: u64 = 0;
/// Byte 0 of a stored record marks the name as claimed.
pub const CLAIMED_MARKER: u8 = 0x01;

/// Who may write a name.
///
/// A claimed name stays claimed forever, even when handed to the zero
/// address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerRecord {
    Unclaimed,
    Claimed(Zone),
}

impl ControllerRecord {
    /// Decode a stored word. Anything without the claimed marker is unclaimed.
    pub fn from_word(word: &Word) -> Self {
        if word.as_bytes()[0] == CLAIMED_MARKER {
            ControllerRecord::Claimed(Zone::from_word(word))
        } else {
            ControllerRecord::Unclaimed
        }
    }

    pub fn to_word(&self) -> Word {
        match self {
            ControllerRecord::Unclaimed => Word::ZERO,
            ControllerRecord::Claimed(zone) => {
                let mut word = zone.to_word();
                word.0[0] = CLAIMED_MARKER;
                word
            }
        }
    }

    pub fn controller(&self) -> Option<Zone> {
        match self {
            ControllerRecord::Unclaimed => None,
            ControllerRecord::Claimed(zone) => Some(*zone),
        }
    }
}

/// Slot of `name` in the controller map: `keccak256(name ‖ index)`.
pub fn controller_slot(name: &Word) -> Slot {
    let mut preimage = [0u8; WORD_BYTES * 2];
    preimage[..WORD_BYTES].copy_from_slice(name.as_bytes());
    preimage[WORD_BYTES..].copy_from_slice(Slot::from_index(CONTROLLERS_INDEX).as_bytes());
    Slot(keccak256(&preimage))
}
