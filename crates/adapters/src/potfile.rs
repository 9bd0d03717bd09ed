// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Potfile parsing.
//!
//! Each line is `hash:plaintext`. Plaintexts that contain the separator or
//! non-printable bytes are written as `$HEX[...]` by the cracking binary, so
//! the separator is the last colon on the line; hashes with salts keep their
//! own colons.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

/// Read a job's output file into a hash → plaintext map.
///
/// A missing file means nothing has been cracked yet and yields an empty map.
pub fn read_output(path: &Path) -> BTreeMap<String, String> {
    match std::fs::read(path) {
        Ok(bytes) => parse_potfile(&String::from_utf8_lossy(&bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read potfile");
            BTreeMap::new()
        }
    }
}

/// Parse potfile contents. Blank lines and lines without a separator are
/// skipped.
pub fn parse_potfile(contents: &str) -> BTreeMap<String, String> {
    contents
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter_map(|line| line.rsplit_once(':'))
        .filter(|(hash, _)| !hash.is_empty())
        .map(|(hash, plain)| (hash.to_string(), decode_plain(plain)))
        .collect()
}

/// Decode a `$HEX[...]` plaintext; anything else is returned as-is.
fn decode_plain(plain: &str) -> String {
    let Some(encoded) = plain.strip_prefix("$HEX[").and_then(|s| s.strip_suffix(']')) else {
        return plain.to_string();
    };
    match hex::decode(encoded) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => plain.to_string(),
    }
}

#[cfg(test)]
#[path = "potfile_tests.rs"]
mod tests;
