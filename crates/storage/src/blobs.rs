// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-addressed wordlist and rule storage.

use crate::atomic::write_atomic;
use crate::StorageError;
use hf_core::{RuleId, WordlistId};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One folder of opaque blobs keyed by name.
#[derive(Debug, Clone)]
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        hf_core::id::is_path_component(name) && self.path(name).is_file()
    }

    /// Store `content` under `name`. Re-uploading identical content is a no-op.
    pub fn put(&self, name: &str, content: &[u8]) -> Result<PathBuf, StorageError> {
        if !hf_core::id::is_path_component(name) {
            return Err(StorageError::InvalidId(name.to_string()));
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        let path = self.path(name);
        if !path.is_file() {
            write_atomic(&path, content)?;
        }
        Ok(path)
    }

    /// Remove `name`; returns false when it did not exist.
    pub fn remove(&self, name: &str) -> Result<bool, StorageError> {
        if !hf_core::id::is_path_component(name) {
            return Ok(false);
        }
        let path = self.path(name);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }
}

/// Wordlists and rules under `{storage}/wordlists` and `{storage}/rules`.
#[derive(Debug, Clone)]
pub struct Blobs {
    wordlists: BlobStore,
    rules: BlobStore,
}

impl Blobs {
    pub fn new(storage_root: &Path) -> Self {
        Self {
            wordlists: BlobStore::new(storage_root.join("wordlists")),
            rules: BlobStore::new(storage_root.join("rules")),
        }
    }

    pub fn create_wordlist(&self, content: &[u8]) -> Result<WordlistId, StorageError> {
        let id = WordlistId::from_content(content);
        self.wordlists.put(&id, content)?;
        Ok(id)
    }

    pub fn delete_wordlist(&self, id: &WordlistId) -> Result<bool, StorageError> {
        self.wordlists.remove(id)
    }

    pub fn wordlist_exists(&self, id: &WordlistId) -> bool {
        self.wordlists.exists(id)
    }

    pub fn wordlist_path(&self, id: &WordlistId) -> PathBuf {
        self.wordlists.path(id)
    }

    pub fn create_rule(&self, content: &[u8]) -> Result<RuleId, StorageError> {
        let id = RuleId::from_content(content);
        self.rules.put(&id, content)?;
        Ok(id)
    }

    pub fn delete_rule(&self, id: &RuleId) -> Result<bool, StorageError> {
        self.rules.remove(id)
    }

    pub fn rule_exists(&self, id: &RuleId) -> bool {
        self.rules.exists(id)
    }

    pub fn rule_path(&self, id: &RuleId) -> PathBuf {
        self.rules.path(id)
    }
}

#[cfg(test)]
#[path = "blobs_tests.rs"]
mod tests;
