//! File-backed storage: CSV question tables and a JSON settings file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::repository::{BankSource, SettingsRepository, Storage};

mod bank_csv;
mod settings_json;

pub use bank_csv::{BankFiles, CsvBankSource, LOOKUP_ANSWER_COLUMN, LOOKUP_STEM_COLUMN};
pub use settings_json::JsonSettingsStore;

/// Default settings file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

impl Storage {
    /// Build a `Storage` reading CSV tables from `data_dir`.
    ///
    /// Settings live at `config_path`, or `data_dir/config.json` when `None`.
    #[must_use]
    pub fn files(data_dir: impl AsRef<Path>, config_path: Option<PathBuf>) -> Self {
        let data_dir = data_dir.as_ref();
        let config_path = config_path.unwrap_or_else(|| data_dir.join(CONFIG_FILE_NAME));
        let bank: Arc<dyn BankSource> = Arc::new(CsvBankSource::in_dir(data_dir));
        let settings: Arc<dyn SettingsRepository> = Arc::new(JsonSettingsStore::new(config_path));
        Self { bank, settings }
    }
}
