// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hash type names and their hashcat `-m` modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Named hash types understood without a raw mode number.
const CATALOGUE: &[(&str, u32)] = &[
    ("md5", 0),
    ("md4", 900),
    ("sha1", 100),
    ("sha224", 1300),
    ("sha256", 1400),
    ("sha384", 10800),
    ("sha512", 1700),
    ("ntlm", 1000),
    ("lm", 3000),
    ("mysql", 300),
    ("md5crypt", 500),
    ("sha256crypt", 7400),
    ("sha512crypt", 1800),
    ("bcrypt", 3200),
    ("netntlmv1", 5500),
    ("netntlmv2", 5600),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashTypeError {
    #[error("unsupported hash type: {0}")]
    Unsupported(String),
}

/// A hash type as supplied by the caller: a catalogue name (`"md5"`) or a
/// raw hashcat mode number (`"1400"`).
///
/// Stored verbatim in job metadata; the mode is resolved when the job runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashType(String);

impl HashType {
    /// Validate and wrap a hash type name.
    pub fn parse(name: &str) -> Result<Self, HashTypeError> {
        let normalized = name.trim().to_ascii_lowercase();
        let hash_type = Self(normalized);
        hash_type.mode()?;
        Ok(hash_type)
    }

    /// The numeric hashcat mode for this hash type.
    pub fn mode(&self) -> Result<u32, HashTypeError> {
        if let Some((_, mode)) = CATALOGUE.iter().find(|(name, _)| *name == self.0) {
            return Ok(*mode);
        }
        self.0.parse::<u32>().map_err(|_| HashTypeError::Unsupported(self.0.clone()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "hash_type_tests.rs"]
mod tests;
