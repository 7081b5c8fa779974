//! Sled-backed ledger opened by the CLI.

use crate::settings::AppConfig;
use anyhow::{bail, Context, Result};
use dmap_core::Dmap;
use dmap_freezone::FreeZone;
use dmap_storage::{open_db, SledStorage, Storage};
use dmap_types::{Key, Receipt, Word, WordError, Zone};
use std::sync::Arc;
use tracing::info;

/// Sled trees of the two slot spaces.
pub const DMAP_TREE: &str = "dmap";
pub const FREEZONE_TREE: &str = "freezone";
/// Root key the freezone is published under.
pub const FREEZONE_ROOT_KEY: &str = "free";

pub struct Ledger {
    pub dmap: Arc<Dmap<SledStorage>>,
    pub freezone: FreeZone<SledStorage>,
}

impl Ledger {
    /// Open the ledger in `config.data_dir`, writing the root pointer and
    /// publishing the freezone under `:free` on first use.
    pub fn open(config: &AppConfig) -> Result<Self> {
        let db = open_db(&config.data_dir)
            .with_context(|| format!("failed to open ledger at {}", config.data_dir.display()))?;

        let dmap = Arc::new(Dmap::genesis(
            SledStorage::open_tree(&db, DMAP_TREE)?,
            config.root_zone,
        )?);

        let free_key = Word::from_label(FREEZONE_ROOT_KEY)?;
        if dmap.get(&config.root_zone, &free_key)?.meta.is_zero() {
            dmap.set(
                &config.root_zone,
                &free_key,
                Word::LOCK,
                config.freezone.to_pointer(),
            )?;
            info!(freezone = %config.freezone, "published freezone under :free");
        }

        let freezone = FreeZone::new(
            config.freezone,
            Arc::clone(&dmap),
            SledStorage::open_tree(&db, FREEZONE_TREE)?,
        );
        Ok(Self { dmap, freezone })
    }

    /// Raw dmap write as `caller`. The freezone zone is only written
    /// through the registry, so it is refused as a caller here.
    pub fn set_entry(&self, caller: &Zone, key: &Key, meta: Word, data: Word) -> Result<Receipt> {
        if *caller == self.freezone.zone() {
            bail!("zone {caller} is the freezone; use `free set` to write its entries");
        }
        Ok(self.dmap.set(caller, key, meta, data)?)
    }

    pub fn flush(&self) -> Result<()> {
        self.dmap.storage().flush()
    }
}

/// Parse a key or value argument: `0x` + 64 hex digits, or a short label.
pub fn parse_word(text: &str) -> Result<Word, WordError> {
    if text.starts_with("0x") {
        Word::from_hex(text)
    } else {
        Word::from_label(text)
    }
}
