//! Error types for the entry store

use dmap_types::{Key, Zone};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DmapError {
    #[error("Entry is locked: zone {zone}, key {key}")]
    Locked { zone: Zone, key: Key },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl DmapError {
    pub fn is_locked(&self) -> bool {
        matches!(self, DmapError::Locked { .. })
    }
}

pub type Result<T> = std::result::Result<T, DmapError>;
