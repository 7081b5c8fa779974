use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of raw bytes in a storage word.
pub const WORD_BYTES: usize = 32;
/// Expected string length of an encoded word (`0x` + 64 hex chars).
pub const WORD_STRING_LENGTH: usize = 2 + WORD_BYTES * 2;
/// Bit of `meta[0]` that marks an entry as permanently immutable.
pub const LOCK_FLAG: u8 = 0x80;
/// Longest label that fits in a word with a trailing zero byte.
pub const MAX_LABEL_BYTES: usize = WORD_BYTES - 1;

/// Errors that can occur when parsing a word from text.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum WordError {
    #[error("word must start with '0x'")]
    MissingPrefix,
    #[error("word must be {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("word payload is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("label must be between 1 and {max} bytes, got {actual}")]
    InvalidLabelLength { max: usize, actual: usize },
}

/// A 256-bit big-endian storage word. Byte 0 is the most significant.
///
/// Keys, `meta` and `data` are all words.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Word(pub [u8; WORD_BYTES]);

/// Keys are opaque caller-chosen words.
pub type Key = Word;

impl Word {
    pub const ZERO: Word = Word([0u8; WORD_BYTES]);

    /// `meta` value with only the lock flag set.
    pub const LOCK: Word = {
        let mut bytes = [0u8; WORD_BYTES];
        bytes[0] = LOCK_FLAG;
        Word(bytes)
    };

    pub fn as_bytes(&self) -> &[u8; WORD_BYTES] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; WORD_BYTES]
    }

    /// Whether the lock flag (most significant bit) is set.
    pub fn is_locked(&self) -> bool {
        self.0[0] & LOCK_FLAG != 0
    }

    /// Copy of this word with the lock flag set or cleared.
    pub fn with_lock(mut self, lock: bool) -> Self {
        if lock {
            self.0[0] |= LOCK_FLAG;
        } else {
            self.0[0] &= !LOCK_FLAG;
        }
        self
    }

    /// Encode a short ASCII label left-aligned in a zero word, the way
    /// human-readable names are turned into keys.
    pub fn from_label(label: &str) -> Result<Self, WordError> {
        let raw = label.as_bytes();
        if raw.is_empty() || raw.len() > MAX_LABEL_BYTES {
            return Err(WordError::InvalidLabelLength {
                max: MAX_LABEL_BYTES,
                actual: raw.len(),
            });
        }
        let mut bytes = [0u8; WORD_BYTES];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self(bytes))
    }

    /// Decode a `0x`-prefixed, 64 hex character string.
    pub fn from_hex(text: &str) -> Result<Self, WordError> {
        let payload = text.strip_prefix("0x").ok_or(WordError::MissingPrefix)?;
        if text.len() != WORD_STRING_LENGTH {
            return Err(WordError::InvalidLength {
                expected: WORD_STRING_LENGTH,
                actual: text.len(),
            });
        }
        let mut bytes = [0u8; WORD_BYTES];
        hex::decode_to_slice(payload, &mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        let mut encoded = String::with_capacity(WORD_STRING_LENGTH);
        encoded.push_str("0x");
        encoded.push_str(&hex::encode(self.0));
        encoded
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({})", self.to_hex())
    }
}

impl FromStr for Word {
    type Err = WordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; WORD_BYTES]> for Word {
    fn from(value: [u8; WORD_BYTES]) -> Self {
        Word(value)
    }
}

impl From<Word> for [u8; WORD_BYTES] {
    fn from(value: Word) -> Self {
        value.0
    }
}

impl From<Word> for String {
    fn from(value: Word) -> Self {
        value.to_hex()
    }
}

impl TryFrom<String> for Word {
    type Error = WordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Word::from_hex(&value)
    }
}
