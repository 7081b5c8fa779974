//! Storage slot derivation.
//!
//! An entry's `data` word lives at `keccak256(pad32(zone) ‖ key)` and its
//! `meta` word one slot above. Both operands enter the hash at full width,
//! so every bit of the zone and of the key is significant.

use crate::hash_functions::keccak256;
use dmap_types::{Key, Slot, Zone};

/// Distance from an entry's data slot to its meta slot.
pub const META_OFFSET: u64 = 1;

/// Slot holding the entry's `data` word.
pub fn data_slot(zone: &Zone, key: &Key) -> Slot {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(zone.to_word().as_bytes());
    preimage[32..].copy_from_slice(key.as_bytes());
    Slot(keccak256(&preimage))
}

/// Slot holding the entry's `meta` word.
pub fn meta_slot(zone: &Zone, key: &Key) -> Slot {
    data_slot(zone, key).offset(META_OFFSET)
}

/// `(meta, data)` slots of an entry.
pub fn entry_slots(zone: &Zone, key: &Key) -> (Slot, Slot) {
    let data = data_slot(zone, key);
    (data.offset(META_OFFSET), data)
}

/// Deterministic identity for a well-known component, taken from the low
/// 20 bytes of `keccak256(label)`.
pub fn derive_zone(label: &str) -> Zone {
    let digest = keccak256(label.as_bytes());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Zone(bytes)
}
