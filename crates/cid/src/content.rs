//! Building CIDs from raw content.

use crate::errors::*;
use cid::multibase::Base;
use cid::multihash::Multihash;
use cid::Cid;
use dmap_crypto::HashType;

/// Multihash algorithms available for content digests.
pub type HashAlgorithm = HashType;

/// Hash `content` with `algorithm` and return its base32 CIDv1 under `codec`.
pub fn cid_for_content(codec: u64, algorithm: HashAlgorithm, content: &[u8]) -> Result<String> {
    let digest = algorithm.create_instance().hash(content);
    let hash = Multihash::<64>::wrap(algorithm.code(), &digest)
        .map_err(|e| CidError::InvalidCid(e.to_string()))?;
    Cid::new_v1(codec, hash)
        .to_string_of_base(Base::Base32Lower)
        .map_err(|e| CidError::InvalidCid(e.to_string()))
}
