//! Content identifiers in dmap entries
//!
//! A CID with a digest of at most 256 bits fits in one entry: its framing
//! (version, multibase, codec, multihash code, digest length) goes in `meta`
//! next to the lock bit and the digest goes in `data`.

pub mod codec;
pub mod content;
pub mod errors;

pub use codec::{
    hash_algorithm, prepare_cid, unpack_cid, DAG_PB_CODEC, RAW_CODEC, SHA2_256_CODE,
};
pub use content::{cid_for_content, HashAlgorithm};
pub use errors::*;
