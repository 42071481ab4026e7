//! Store configuration: where the two CSV stores and exported reports live.

use std::path::{Path, PathBuf};

/// Environment variable overriding [`StoreConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "DECOR_DATA_DIR";
/// Environment variable overriding [`StoreConfig::report_dir`].
pub const REPORT_DIR_ENV: &str = "DECOR_REPORT_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub inventory_file: String,
    pub deleted_file: String,
    pub report_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_inventory_file() -> String {
    "inventory.csv".to_string()
}

fn default_deleted_file() -> String {
    "deleted_items.csv".to_string()
}

/// The user's Downloads folder, else `<home>/Downloads`, else the working directory.
fn default_report_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            inventory_file: default_inventory_file(),
            deleted_file: default_deleted_file(),
            report_dir: default_report_dir(),
        }
    }
}

impl StoreConfig {
    /// Defaults overridden by `DECOR_DATA_DIR` / `DECOR_REPORT_DIR` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key).map(PathBuf::from))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<PathBuf>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|p| !p.as_os_str().is_empty()) {
            config.data_dir = dir;
        }
        if let Some(dir) = lookup(REPORT_DIR_ENV).filter(|p| !p.as_os_str().is_empty()) {
            config.report_dir = dir;
        }
        config
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    pub fn inventory_path(&self) -> PathBuf {
        self.data_dir.join(&self.inventory_file)
    }

    pub fn deleted_path(&self) -> PathBuf {
        self.data_dir.join(&self.deleted_file)
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }
}
