// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wordlist and rule identifiers.
//!
//! Both are content-addressed: the ID is derived from a SHA-256 digest of the
//! uploaded bytes, so uploading the same file twice yields the same ID.

use sha2::{Digest, Sha256};

crate::define_id! {
    /// Identifier of an uploaded wordlist.
    pub struct WordlistId("wl-");
}

crate::define_id! {
    /// Identifier of an uploaded mutation rule file.
    pub struct RuleId("rul-");
}

/// Hex characters of the digest kept in a blob ID.
const DIGEST_CHARS: usize = 24;

fn digest_suffix(content: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(content));
    digest[..DIGEST_CHARS].to_string()
}

impl WordlistId {
    pub fn from_content(content: &[u8]) -> Self {
        Self::from_string(format!("{}{}", Self::PREFIX, digest_suffix(content)))
    }
}

impl RuleId {
    pub fn from_content(content: &[u8]) -> Self {
        Self::from_string(format!("{}{}", Self::PREFIX, digest_suffix(content)))
    }
}
