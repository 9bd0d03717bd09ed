// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use thiserror::Error;

/// Errors from metadata and blob storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid id for storage path: {0:?}")]
    InvalidId(String),
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io { path: path.into(), source }
    }

    /// True when the underlying cause is a missing file or folder.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
