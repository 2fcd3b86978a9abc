//! Crate-wide error taxonomy.
//!
//! Per-rule and per-file failures that the engine and pipeline can recover
//! from (rule internal errors, skipped edits, race detection) are never
//! represented here — they become fields on `FileResult` / `PipelineResult`
//! instead. This enum only covers failures that abort the operation in
//! progress.

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::migrator::MigrationError;

#[derive(Debug, thiserror::Error)]
pub enum RumdlError {
    #[error("{stage}: {source}")]
    Io {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("migration: {0}")]
    Migration(#[from] MigrationError),

    #[error("cancelled")]
    Cancelled,
}

impl RumdlError {
    pub fn io(stage: &'static str, source: std::io::Error) -> Self {
        RumdlError::Io { stage, source }
    }
}

pub type Result<T> = std::result::Result<T, RumdlError>;
