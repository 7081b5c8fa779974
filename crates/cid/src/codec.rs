//! CID <-> entry word packing.
//!
//! `meta` layout, byte 0 most significant:
//!
//! | bytes  | field                                          |
//! |--------|------------------------------------------------|
//! | 0      | bit 7 lock flag, bits 6..0 zero                |
//! | 1      | CID version                                    |
//! | 2      | zero                                           |
//! | 3      | digest length in bytes                         |
//! | 4..8   | multibase code point, big-endian, 0 for CIDv0  |
//! | 8..16  | content codec, big-endian                      |
//! | 16..24 | multihash code, big-endian                     |
//! | 24..32 | zero                                           |
//!
//! `data` holds the digest right-aligned.

use crate::content::HashAlgorithm;
use crate::errors::*;
use cid::multibase::Base;
use cid::multihash::Multihash;
use cid::{Cid, CidGeneric, Version};
use dmap_types::{Word, WORD_BYTES};
use std::str::FromStr;
use tracing::debug;

/// dag-pb, the only codec a CIDv0 can carry.
pub const DAG_PB_CODEC: u64 = 0x70;
/// Raw binary content.
pub const RAW_CODEC: u64 = 0x55;
/// sha2-256, the only multihash a CIDv0 can carry.
pub const SHA2_256_CODE: u64 = 0x12;

/// Largest digest accepted while parsing, so oversized digests are
/// reported as such rather than as unparseable text.
const PARSE_DIGEST_BYTES: usize = 256;

const VERSION_BYTE: usize = 1;
const LENGTH_BYTE: usize = 3;
const MULTIBASE_BYTES: std::ops::Range<usize> = 4..8;
const CODEC_BYTES: std::ops::Range<usize> = 8..16;
const HASH_CODE_BYTES: std::ops::Range<usize> = 16..24;

/// Pack a textual CID into `(meta, data)`, setting the lock bit when `lock`.
pub fn prepare_cid(text: &str, lock: bool) -> Result<(Word, Word)> {
    let cid = CidGeneric::<PARSE_DIGEST_BYTES>::from_str(text)
        .map_err(|e| CidError::InvalidCid(e.to_string()))?;
    let hash = cid.hash();

    let digest = hash.digest();
    if digest.len() > WORD_BYTES {
        return Err(CidError::DigestTooLarge {
            bits: digest.len() * 8,
        });
    }

    let (version, prefix) = match cid.version() {
        Version::V0 => (0u8, 0u32),
        Version::V1 => (1u8, multibase_prefix(text)?),
    };

    let mut meta = [0u8; WORD_BYTES];
    meta[VERSION_BYTE] = version;
    meta[LENGTH_BYTE] = digest.len() as u8;
    meta[MULTIBASE_BYTES].copy_from_slice(&prefix.to_be_bytes());
    meta[CODEC_BYTES].copy_from_slice(&cid.codec().to_be_bytes());
    meta[HASH_CODE_BYTES].copy_from_slice(&hash.code().to_be_bytes());

    let mut data = [0u8; WORD_BYTES];
    data[WORD_BYTES - digest.len()..].copy_from_slice(digest);

    debug!(
        version,
        codec = cid.codec(),
        hash_code = hash.code(),
        lock,
        "packed cid"
    );
    Ok((Word(meta).with_lock(lock), Word(data)))
}

/// Rebuild the CID string packed by [`prepare_cid`]. The lock bit is ignored.
pub fn unpack_cid(meta: &Word, data: &Word) -> Result<String> {
    let meta = meta.with_lock(false);
    let m = meta.as_bytes();

    if m[0] != 0 || m[2] != 0 || m[24..].iter().any(|b| *b != 0) {
        return Err(CidError::Malformed("reserved meta bits are set".into()));
    }

    let len = m[LENGTH_BYTE] as usize;
    if len > WORD_BYTES {
        return Err(CidError::Malformed(format!(
            "digest length {len} exceeds {WORD_BYTES} bytes"
        )));
    }
    let (padding, digest) = data.as_bytes().split_at(WORD_BYTES - len);
    if padding.iter().any(|b| *b != 0) {
        return Err(CidError::Malformed("data has non-zero padding".into()));
    }

    let prefix = be_u64(&m[MULTIBASE_BYTES]) as u32;
    let codec = be_u64(&m[CODEC_BYTES]);
    let code = be_u64(&m[HASH_CODE_BYTES]);
    let hash =
        Multihash::<64>::wrap(code, digest).map_err(|e| CidError::Malformed(e.to_string()))?;

    match m[VERSION_BYTE] {
        0 => {
            if prefix != 0 || codec != DAG_PB_CODEC {
                return Err(CidError::Malformed(
                    "CIDv0 must be dag-pb without a multibase prefix".into(),
                ));
            }
            let cid = Cid::new_v0(hash).map_err(|e| CidError::Malformed(e.to_string()))?;
            Ok(cid.to_string())
        }
        1 => {
            let code = char::from_u32(prefix).ok_or_else(|| {
                CidError::Malformed(format!("multibase {prefix:#x} is not a char"))
            })?;
            let base = Base::from_code(code).map_err(|e| CidError::Malformed(e.to_string()))?;
            Cid::new_v1(codec, hash)
                .to_string_of_base(base)
                .map_err(|e| CidError::Malformed(e.to_string()))
        }
        other => Err(CidError::Malformed(format!("unknown CID version {other}"))),
    }
}

fn multibase_prefix(text: &str) -> Result<u32> {
    let (base, _) =
        cid::multibase::decode(text).map_err(|e| CidError::InvalidMultibase(e.to_string()))?;
    Ok(u32::from(base.code()))
}

/// Hash algorithm named by a packed `meta`, if dmap can compute it.
pub fn hash_algorithm(meta: &Word) -> Option<HashAlgorithm> {
    HashAlgorithm::from_code(be_u64(&meta.as_bytes()[HASH_CODE_BYTES]))
}

fn be_u64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CID_DEFAULT: &str = "bafkreidsszpx34yqnshrtuszx7n77zxttk2s54kc2m5cftjutaumxe67fa";
    const CID_V0: &str = "QmbizqGE1E1rES19m9CKNkLYfbbAHNnYFwE6cMe8JVV33H";

    #[test]
    fn test_meta_layout() {
        let (meta, data) = prepare_cid(CID_DEFAULT, true).unwrap();
        let m = meta.as_bytes();
        assert_eq!(m[0], 0x80);
        assert_eq!(m[VERSION_BYTE], 1);
        assert_eq!(m[2], 0);
        assert_eq!(be_u64(&m[MULTIBASE_BYTES]), u64::from(b'b'));
        assert_eq!(m[LENGTH_BYTE], 32);
        assert_eq!(be_u64(&m[CODEC_BYTES]), RAW_CODEC);
        assert_eq!(be_u64(&m[HASH_CODE_BYTES]), SHA2_256_CODE);
        assert!(!data.is_zero());
    }

    #[test]
    fn test_v0_has_no_multibase() {
        let (meta, _) = prepare_cid(CID_V0, false).unwrap();
        let m = meta.as_bytes();
        assert_eq!(m[VERSION_BYTE], 0);
        assert!(m[MULTIBASE_BYTES].iter().all(|b| *b == 0));
        assert_eq!(be_u64(&m[CODEC_BYTES]), DAG_PB_CODEC);
    }

    #[test]
    fn test_reserved_bits_rejected() {
        let (meta, data) = prepare_cid(CID_DEFAULT, false).unwrap();
        for byte in [0usize, 2, 30] {
            let mut bad = meta;
            bad.0[byte] |= 0x01;
            assert!(matches!(unpack_cid(&bad, &data), Err(CidError::Malformed(_))));
        }
    }

    #[test]
    fn test_bad_padding_rejected() {
        let (mut meta, data) = prepare_cid(CID_DEFAULT, false).unwrap();
        meta.0[LENGTH_BYTE] = 20;
        assert!(matches!(unpack_cid(&meta, &data), Err(CidError::Malformed(_))));

        meta.0[LENGTH_BYTE] = 33;
        assert!(matches!(unpack_cid(&meta, &data), Err(CidError::Malformed(_))));
    }

    #[test]
    fn test_unknown_version_and_base_rejected() {
        let (meta, data) = prepare_cid(CID_DEFAULT, false).unwrap();

        let mut bad_version = meta;
        bad_version.0[VERSION_BYTE] = 2;
        assert!(matches!(
            unpack_cid(&bad_version, &data),
            Err(CidError::Malformed(_))
        ));

        let mut bad_base = meta;
        bad_base.0[MULTIBASE_BYTES].copy_from_slice(&u32::from(b'!').to_be_bytes());
        assert!(matches!(unpack_cid(&bad_base, &data), Err(CidError::Malformed(_))));

        let mut surrogate = meta;
        surrogate.0[MULTIBASE_BYTES].copy_from_slice(&0xD800u32.to_be_bytes());
        assert!(matches!(unpack_cid(&surrogate, &data), Err(CidError::Malformed(_))));
    }

    #[test]
    fn test_emoji_multibase_roundtrip() {
        let text = Cid::from_str(CID_DEFAULT)
            .unwrap()
            .to_string_of_base(Base::Base256Emoji)
            .unwrap();
        assert!(text.starts_with('🚀'));

        for lock in [false, true] {
            let (meta, data) = prepare_cid(&text, lock).unwrap();
            assert_eq!(be_u64(&meta.as_bytes()[MULTIBASE_BYTES]), 0x1F680);
            assert_eq!(unpack_cid(&meta, &data).unwrap(), text);
        }
        assert_eq!(
            prepare_cid(&text, false).unwrap().1,
            prepare_cid(CID_DEFAULT, false).unwrap().1
        );
    }

    #[test]
    fn test_digest_over_512_bits_reports_its_size() {
        let hash = Multihash::<80>::wrap(0x00, &[0x5Au8; 80]).unwrap();
        let text = CidGeneric::<80>::new_v1(RAW_CODEC, hash).to_string();
        assert_eq!(
            prepare_cid(&text, false),
            Err(CidError::DigestTooLarge { bits: 640 })
        );
    }

    #[test]
    fn test_hash_algorithm_from_meta() {
        let (meta, _) = prepare_cid(CID_DEFAULT, true).unwrap();
        assert_eq!(hash_algorithm(&meta), Some(HashAlgorithm::Sha2_256));
        assert_eq!(hash_algorithm(&Word::ZERO), None);
    }

    #[test]
    fn test_garbage_text_rejected() {
        assert!(matches!(
            prepare_cid("not a cid", false),
            Err(CidError::InvalidCid(_))
        ));
        assert!(matches!(prepare_cid("", false), Err(CidError::InvalidCid(_))));
    }
}
