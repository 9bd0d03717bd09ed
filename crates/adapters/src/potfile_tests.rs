// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[test]
fn parses_hash_plain_lines() {
    let map = parse_potfile(
        "5f4dcc3b5aa765d61d8327deb882cf99:password\ne10adc3949ba59abbe56e057f20f883e:123456\n",
    );
    assert_eq!(map.len(), 2);
    assert_eq!(map["5f4dcc3b5aa765d61d8327deb882cf99"], "password");
    assert_eq!(map["e10adc3949ba59abbe56e057f20f883e"], "123456");
}

#[yare::parameterized(
    empty_plain  = { "abc:", "abc", "" },
    salted_hash  = { "abc:salt:plain", "abc:salt", "plain" },
    hex_plain    = { "abc:$HEX[70613a7373]", "abc", "pa:ss" },
    upper_hex    = { "abc:$HEX[50615353]", "abc", "PaSS" },
    bad_hex      = { "abc:$HEX[zz]", "abc", "$HEX[zz]" },
    odd_hex      = { "abc:$HEX[123]", "abc", "$HEX[123]" },
    crlf         = { "abc:plain\r", "abc", "plain" },
)]
fn line_variants(line: &str, hash: &str, plain: &str) {
    let map = parse_potfile(line);
    assert_eq!(map.get(hash).map(String::as_str), Some(plain));
}

#[test]
fn skips_blank_and_malformed_lines() {
    let map = parse_potfile("\n\nno-separator\n:orphan\nabc:def\n");
    assert_eq!(map.len(), 1);
    assert_eq!(map["abc"], "def");
}

#[test]
fn missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    assert!(read_output(&dir.path().join("output.pot")).is_empty());
}

#[test]
fn reads_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output.pot");
    std::fs::write(&path, "5f4dcc3b5aa765d61d8327deb882cf99:password\n").unwrap();
    assert_eq!(read_output(&path)["5f4dcc3b5aa765d61d8327deb882cf99"], "password");
}

proptest! {
    #[test]
    fn cracked_subset_yields_one_entry_per_line(
        targets in prop::collection::btree_map("[0-9a-f]{32}", "[a-zA-Z0-9!@#]{0,16}", 1..40),
        picks in prop::collection::vec(any::<bool>(), 40),
    ) {
        let cracked: Vec<_> = targets
            .iter()
            .zip(picks.iter())
            .filter(|(_, keep)| **keep)
            .map(|((hash, plain), _)| (hash.clone(), plain.clone()))
            .collect();
        let contents: String =
            cracked.iter().map(|(hash, plain)| format!("{hash}:{plain}\n")).collect();

        let map = parse_potfile(&contents);
        prop_assert_eq!(map.len(), cracked.len());
        prop_assert!(map.len() <= targets.len());
        for (hash, plain) in &cracked {
            prop_assert_eq!(map.get(hash), Some(plain));
        }
    }
}
