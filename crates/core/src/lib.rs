//! dmap entry store
//!
//! Every zone owns an independent namespace of two-word entries, addressed
//! by hashing the zone together with a 256-bit key. An entry whose `meta`
//! word has its top bit set is locked forever. This crate also resolves
//! human-readable paths from the genesis root through chains of entries.

pub mod dmap;
pub mod errors;
pub mod walk;

pub use dmap::{Dmap, ROOT_DATA_SLOT, ROOT_META_SLOT};
pub use errors::*;
pub use walk::{parse_path, walk, Rune, Step, WalkError};
