// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn md5_job() -> JobMetadata {
    JobMetadata::new(
        HashType::parse("md5").unwrap(),
        WordlistId::from_string("wl-rockyou"),
        None,
    )
}

#[test]
fn new_job_is_pending() {
    assert_eq!(md5_job().status, JobStatus::Pending);
}

#[test]
fn metadata_json_layout() {
    let json = serde_json::to_value(md5_job()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"status": "pending", "hashType": "md5", "wordlist": "wl-rockyou"})
    );
}

#[test]
fn metadata_json_includes_rule_when_set() {
    let mut job = md5_job();
    job.rule = Some(RuleId::from_string("rul-best64"));
    let json = serde_json::to_value(&job).unwrap();
    assert_eq!(json["rule"], "rul-best64");

    let parsed: JobMetadata = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, job);
}

#[yare::parameterized(
    pending  = { JobStatus::Pending, false },
    running  = { JobStatus::Running, false },
    complete = { JobStatus::Complete, true },
    stopped  = { JobStatus::Stopped, true },
    error    = { JobStatus::Error, true },
    unknown  = { JobStatus::Unknown, false },
)]
fn terminal_statuses(status: JobStatus, terminal: bool) {
    assert_eq!(status.is_terminal(), terminal);
}

#[yare::parameterized(
    success  = { 0, JobStatus::Complete },
    exhausted = { 1, JobStatus::Error },
    failure  = { 255, JobStatus::Error },
    signal   = { -1, JobStatus::Error },
)]
fn exit_code_decides_outcome(code: i32, expected: JobStatus) {
    assert_eq!(JobStatus::from_exit_code(code), expected);
}

#[test]
fn with_status_keeps_other_fields() {
    let job = md5_job().with_status(JobStatus::Running);
    assert_eq!(job.status, JobStatus::Running);
    assert_eq!(job.wordlist, "wl-rockyou");
}

#[test]
fn hashes_are_trimmed_and_blanks_dropped() {
    let raw =
        ["  5f4dcc3b5aa765d61d8327deb882cf99\r", "", "   ", "0d107d09f5bbe40cade3de5c71e9e9b7"];
    assert_eq!(
        normalize_hashes(&raw),
        vec!["5f4dcc3b5aa765d61d8327deb882cf99", "0d107d09f5bbe40cade3de5c71e9e9b7"]
    );
}
