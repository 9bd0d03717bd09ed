// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn hashes_from_args_and_file_are_combined() {
    let args = vec!["aaaa".to_string(), " bbbb ".to_string()];
    let body = "cccc\n\n  dddd\r\n";

    assert_eq!(collect_hashes(args, body), vec!["aaaa", "bbbb", "cccc", "dddd"]);
}

#[test]
fn blank_input_yields_nothing() {
    assert!(collect_hashes(vec![" ".to_string()], "\n\n").is_empty());
}
