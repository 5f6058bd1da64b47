//! Storage configuration.
//!
//! The backend is picked once at startup; everything downstream only sees
//! `Arc<dyn StorageBackend>`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::storage::{CsvFileBackend, JsonFileBackend, StorageBackend, StorageError};

pub const BACKEND_ENV: &str = "WEBSTORE_BACKEND";
pub const DATA_DIR_ENV: &str = "WEBSTORE_DATA_DIR";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported storage backend '{0}' (expected one of: json, csv)")]
    UnsupportedBackend(String),
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum BackendKind {
    #[default]
    Json,
    Csv,
}

impl BackendKind {
    pub fn available() -> &'static [BackendKind] {
        &[BackendKind::Json, BackendKind::Csv]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Json => "json",
            BackendKind::Csv => "csv",
        }
    }

    /// Where data lives when no directory is configured.
    pub fn default_data_dir(self) -> PathBuf {
        match self {
            BackendKind::Json => PathBuf::from("data"),
            BackendKind::Csv => PathBuf::from("data_csv"),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(BackendKind::Json),
            "csv" => Ok(BackendKind::Csv),
            _ => Err(ConfigError::UnsupportedBackend(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: BackendKind,
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(BackendKind::default())
    }
}

impl StoreConfig {
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            data_dir: backend.default_data_dir(),
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Read `WEBSTORE_BACKEND` / `WEBSTORE_DATA_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup(BACKEND_ENV) {
            Some(raw) if !raw.trim().is_empty() => raw.parse().unwrap_or_else(|err| {
                warn!(error = %err, "falling back to the json backend");
                BackendKind::Json
            }),
            _ => BackendKind::Json,
        };

        let config = Self::new(backend);
        match lookup(DATA_DIR_ENV) {
            Some(dir) if !dir.trim().is_empty() => config.with_data_dir(dir),
            _ => config,
        }
    }

    /// Create the data directory and open the configured backend.
    pub fn open_backend(&self) -> Result<Arc<dyn StorageBackend>, StorageError> {
        let backend: Arc<dyn StorageBackend> = match self.backend {
            BackendKind::Json => Arc::new(JsonFileBackend::open(&self.data_dir)?),
            BackendKind::Csv => Arc::new(CsvFileBackend::open(&self.data_dir)?),
        };
        Ok(backend)
    }
}
