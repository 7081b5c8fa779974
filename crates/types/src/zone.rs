use crate::word::{Word, WORD_BYTES};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing a zone address string.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ZoneError {
    #[error("zone address must start with '0x'")]
    InvalidPrefix,
    #[error("zone address must be {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("zone address payload is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Number of raw bytes contained in a zone address.
pub const ZONE_BYTES: usize = 20;
/// Expected string length of an encoded zone (`0x` + 40 hex chars).
pub const ZONE_STRING_LENGTH: usize = 2 + ZONE_BYTES * 2;

/// Encode a 20-byte identity into its `0x`-prefixed lowercase hex form.
pub fn encode_zone(bytes: &[u8; ZONE_BYTES]) -> String {
    let mut encoded = String::with_capacity(ZONE_STRING_LENGTH);
    encoded.push_str("0x");
    encoded.push_str(&hex::encode(bytes));
    encoded
}

/// Attempt to decode a zone address string into the raw bytes.
pub fn decode_zone(address: &str) -> Result<[u8; ZONE_BYTES], ZoneError> {
    let Some(payload) = address.strip_prefix("0x") else {
        return Err(ZoneError::InvalidPrefix);
    };

    if address.len() != ZONE_STRING_LENGTH {
        return Err(ZoneError::InvalidLength {
            expected: ZONE_STRING_LENGTH,
            actual: address.len(),
        });
    }

    let mut bytes = [0u8; ZONE_BYTES];
    hex::decode_to_slice(payload, &mut bytes)?;
    Ok(bytes)
}

/// An external identity owning its own key namespace.
///
/// Zones are supplied by the caller's context; dmap never creates them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Zone(pub [u8; ZONE_BYTES]);

impl Zone {
    pub const ZERO: Zone = Zone([0u8; ZONE_BYTES]);

    pub fn as_bytes(&self) -> &[u8; ZONE_BYTES] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ZONE_BYTES]
    }

    /// Left-pad the address to a full word (the hashing/topic encoding).
    pub fn to_word(&self) -> Word {
        let mut bytes = [0u8; WORD_BYTES];
        bytes[WORD_BYTES - ZONE_BYTES..].copy_from_slice(&self.0);
        Word(bytes)
    }

    /// Place the address in the high bytes of a word, the layout used when an
    /// entry's `data` points at another zone.
    pub fn to_pointer(&self) -> Word {
        let mut bytes = [0u8; WORD_BYTES];
        bytes[..ZONE_BYTES].copy_from_slice(&self.0);
        Word(bytes)
    }

    /// Read the zone a `data` word points at (its high 20 bytes).
    pub fn from_pointer(word: &Word) -> Self {
        let mut bytes = [0u8; ZONE_BYTES];
        bytes.copy_from_slice(&word.0[..ZONE_BYTES]);
        Zone(bytes)
    }

    /// Read a zone stored left-padded in the low 20 bytes of a word.
    pub fn from_word(word: &Word) -> Self {
        let mut bytes = [0u8; ZONE_BYTES];
        bytes.copy_from_slice(&word.0[WORD_BYTES - ZONE_BYTES..]);
        Zone(bytes)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_zone(&self.0))
    }
}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Zone({})", encode_zone(&self.0))
    }
}

impl FromStr for Zone {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_zone(s).map(Zone)
    }
}

impl From<[u8; ZONE_BYTES]> for Zone {
    fn from(value: [u8; ZONE_BYTES]) -> Self {
        Zone(value)
    }
}

impl From<Zone> for String {
    fn from(value: Zone) -> Self {
        encode_zone(&value.0)
    }
}

impl TryFrom<String> for Zone {
    type Error = ZoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        decode_zone(&value).map(Zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let bytes = [0xABu8; ZONE_BYTES];
        let encoded = encode_zone(&bytes);
        assert!(encoded.starts_with("0x"));
        assert_eq!(encoded.len(), ZONE_STRING_LENGTH);

        let decoded = decode_zone(&encoded).expect("zone should decode");
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn invalid_prefix_rejected() {
        let bad = "00".repeat(ZONE_BYTES + 1);
        let err = decode_zone(&bad).unwrap_err();
        assert!(matches!(err, ZoneError::InvalidPrefix));
    }

    #[test]
    fn invalid_length_rejected() {
        let bad = "0x".to_string() + &"00".repeat(ZONE_BYTES - 1);
        let err = decode_zone(&bad).unwrap_err();
        assert!(matches!(err, ZoneError::InvalidLength { .. }));
    }

    #[test]
    fn invalid_hex_rejected() {
        let bad = format!("0x{}", "gg".repeat(ZONE_BYTES));
        let err = decode_zone(&bad).unwrap_err();
        assert!(matches!(err, ZoneError::InvalidHex(_)));
    }

    #[test]
    fn hex_errors_compare_by_value() {
        let bad = format!("0x{}", "gg".repeat(ZONE_BYTES));
        assert_eq!(
            decode_zone(&bad).unwrap_err(),
            ZoneError::InvalidHex(hex::FromHexError::InvalidHexCharacter { c: 'g', index: 0 })
        );
        assert_eq!(
            "0x12".parse::<Zone>().unwrap_err(),
            ZoneError::InvalidLength {
                expected: ZONE_STRING_LENGTH,
                actual: 4
            }
        );
    }

    #[test]
    fn word_layouts() {
        let zone = Zone([0x11u8; ZONE_BYTES]);

        let padded = zone.to_word();
        assert!(padded.0[..12].iter().all(|b| *b == 0));
        assert_eq!(Zone::from_word(&padded), zone);

        let pointer = zone.to_pointer();
        assert!(pointer.0[ZONE_BYTES..].iter().all(|b| *b == 0));
        assert_eq!(Zone::from_pointer(&pointer), zone);
    }
}
