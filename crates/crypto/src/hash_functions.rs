//! Hash functions for dmap
//!
//! Keccak-256 addresses storage; the remaining functions back the content
//! digests that CIDs refer to. Every function is tagged with its multihash
//! code so digests can be framed as self-describing identifiers.

use serde::{Deserialize, Serialize};
use sha2::Digest;

/// Trait for hash functions
pub trait HashFunction {
    /// Hash input data and return the digest
    fn hash(&self, data: &[u8]) -> Vec<u8>;

    /// Get the output size of the hash function in bytes
    fn output_size(&self) -> usize;

    /// Get the name of the hash function
    fn name(&self) -> &'static str;
}

/// SHA2-256 hash implementation
pub struct Sha256;

impl HashFunction for Sha256 {
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        sha2::Sha256::digest(data).to_vec()
    }

    fn output_size(&self) -> usize {
        32
    }

    fn name(&self) -> &'static str {
        "sha2-256"
    }
}

/// SHA2-512 hash implementation
pub struct Sha512;

impl HashFunction for Sha512 {
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        sha2::Sha512::digest(data).to_vec()
    }

    fn output_size(&self) -> usize {
        64
    }

    fn name(&self) -> &'static str {
        "sha2-512"
    }
}

/// SHA3-256 hash implementation
pub struct Sha3_256;

impl HashFunction for Sha3_256 {
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        sha3::Sha3_256::digest(data).to_vec()
    }

    fn output_size(&self) -> usize {
        32
    }

    fn name(&self) -> &'static str {
        "sha3-256"
    }
}

/// Keccak256 hash implementation
pub struct Keccak256;

impl HashFunction for Keccak256 {
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        keccak256(data).to_vec()
    }

    fn output_size(&self) -> usize {
        32
    }

    fn name(&self) -> &'static str {
        "keccak-256"
    }
}

/// BLAKE2b with a 160-bit output
pub struct Blake2b160;

impl HashFunction for Blake2b160 {
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        use blake2::digest::consts::U20;
        blake2::Blake2b::<U20>::digest(data).to_vec()
    }

    fn output_size(&self) -> usize {
        20
    }

    fn name(&self) -> &'static str {
        "blake2b-160"
    }
}

/// Keccak-256 of `data` as a fixed array.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    sha3::Keccak256::digest(data).into()
}

/// Hash function type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashType {
    Sha2_256,
    Sha2_512,
    Sha3_256,
    Keccak256,
    Blake2b160,
}

impl HashType {
    pub const ALL: [HashType; 5] = [
        HashType::Sha2_256,
        HashType::Sha2_512,
        HashType::Sha3_256,
        HashType::Keccak256,
        HashType::Blake2b160,
    ];

    /// Multihash table code
    pub fn code(&self) -> u64 {
        match self {
            HashType::Sha2_256 => 0x12,
            HashType::Sha2_512 => 0x13,
            HashType::Sha3_256 => 0x16,
            HashType::Keccak256 => 0x1b,
            HashType::Blake2b160 => 0xb214,
        }
    }

    /// Look a hash type up by multihash code
    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Look a hash type up by multihash name (e.g. `sha2-256`)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.create_instance().name() == name)
    }

    /// Digest size in bytes
    pub fn output_size(&self) -> usize {
        self.create_instance().output_size()
    }

    /// Create a hash function instance
    pub fn create_instance(&self) -> Box<dyn HashFunction> {
        match self {
            HashType::Sha2_256 => Box::new(Sha256),
            HashType::Sha2_512 => Box::new(Sha512),
            HashType::Sha3_256 => Box::new(Sha3_256),
            HashType::Keccak256 => Box::new(Keccak256),
            HashType::Blake2b160 => Box::new(Blake2b160),
        }
    }
}

impl std::fmt::Display for HashType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.create_instance().name())
    }
}
