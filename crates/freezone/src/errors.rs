//! Error types for the freezone registry

use dmap_core::DmapError;
use dmap_types::Word;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FreezoneError {
    #[error("Caller does not control name {name}")]
    NotOwner { name: Word },

    #[error("Name already taken: {name}")]
    AlreadyTaken { name: Word },

    #[error(transparent)]
    Dmap(#[from] DmapError),

    #[error("Registry storage error: {0}")]
    StorageError(#[from] anyhow::Error),
}

impl FreezoneError {
    /// Whether the write was refused because the underlying entry is locked.
    pub fn is_locked(&self) -> bool {
        matches!(self, FreezoneError::Dmap(e) if e.is_locked())
    }
}

pub type Result<T> = std::result::Result<T, FreezoneError>;
