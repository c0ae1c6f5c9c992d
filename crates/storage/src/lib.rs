#![forbid(unsafe_code)]

pub mod files;
pub mod repository;

pub use repository::{BankSource, InMemoryRepository, SettingsRepository, Storage, StorageError};
