//! Studio configuration.
//!
//! Precedence: environment (`ATELIER__*`) > TOML file (`ATELIER_CONFIG` path,
//! else `config/atelier.toml`) > defaults.

use crate::error::StudioResult;
use crate::store::DEFAULT_DB_DIR;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/atelier.toml";
pub const CONFIG_PATH_VAR: &str = "ATELIER_CONFIG";
pub const ENV_PREFIX: &str = "ATELIER";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Root directory; the collections DB lives in `<storage_path>/atelier_collections`.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// When set, every save is mirrored as `<key>.json` into this directory.
    #[serde(default)]
    pub mirror_path: Option<PathBuf>,
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_app_name() -> String {
    "Atelier".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_filter() -> String {
    "atelier=info".to_string()
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            storage_path: default_storage_path(),
            mirror_path: None,
            log_filter: default_log_filter(),
        }
    }
}

impl StudioConfig {
    /// Loads from the file named by `ATELIER_CONFIG` (or the default path) and the environment.
    pub fn load() -> StudioResult<Self> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Like [`StudioConfig::load`] with an explicit file. A missing file is skipped.
    pub fn load_from(path: &Path) -> StudioResult<Self> {
        let builder = config::Config::builder()
            .set_default("app_name", default_app_name())?
            .set_default("storage_path", "./data")?
            .set_default("log_filter", default_log_filter())?;

        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(built.try_deserialize()?)
    }

    /// Directory of the sled collections DB.
    pub fn db_path(&self) -> PathBuf {
        self.storage_path.join(DEFAULT_DB_DIR)
    }

    pub fn save_to_path(&self, path: &Path) -> StudioResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}
