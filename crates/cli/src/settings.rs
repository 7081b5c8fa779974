//! CLI settings
//!
//! Defaults, then an optional TOML file, then `DMAP_*` environment variables.
//! Nested keys use a double underscore, e.g. `DMAP_COST__READ=100`.

use anyhow::{bail, Result};
use config::{Config, Environment, File as ConfigFile};
use dmap_crypto::derive_zone;
use dmap_types::{CostSchedule, Zone};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "./dmap-data";
pub const DEFAULT_LOG_LEVEL: &str = "warn";
/// Labels the default root and freezone addresses are derived from.
pub const ROOT_ZONE_LABEL: &str = "rootzone";
pub const FREEZONE_LABEL: &str = "freezone";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub root_zone: Zone,
    pub freezone: Zone,
    pub log_level: String,
    #[serde(default)]
    pub cost: CostSchedule,
}

impl AppConfig {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(config_path, dmap_env())
    }

    fn load_with_env(config_path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("data_dir", DEFAULT_DATA_DIR)?
            .set_default("root_zone", derive_zone(ROOT_ZONE_LABEL).to_string())?
            .set_default("freezone", derive_zone(FREEZONE_LABEL).to_string())?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?;

        if let Some(path) = config_path {
            if !path.exists() {
                bail!(
                    "Configuration file {} not found (specified via --config)",
                    path.display()
                );
            }
            builder = builder.add_source(ConfigFile::from(path));
        }

        let config = builder.add_source(env).build()?;
        Ok(config.try_deserialize()?)
    }
}

fn dmap_env() -> Environment {
    Environment::with_prefix("DMAP")
        .prefix_separator("_")
        .separator("__")
}
