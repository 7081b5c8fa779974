//! Cryptographic primitives for dmap: storage addressing and the digest
//! functions behind content identifiers.

pub mod hash_functions;
pub mod slots;

pub use hash_functions::{
    keccak256, Blake2b160, HashFunction, HashType, Keccak256, Sha256, Sha3_256, Sha512,
};
pub use slots::{data_slot, derive_zone, entry_slots, meta_slot, META_OFFSET};
