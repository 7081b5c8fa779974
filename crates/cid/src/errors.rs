use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidError {
    #[error("Hash exceeds 256 bits ({bits} bits)")]
    DigestTooLarge { bits: usize },

    #[error("Invalid CID: {0}")]
    InvalidCid(String),

    #[error("Invalid multibase: {0}")]
    InvalidMultibase(String),

    #[error("Malformed CID words: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, CidError>;
