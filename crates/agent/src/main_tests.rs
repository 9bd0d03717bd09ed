// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hf_storage::StorageError;

#[yare::parameterized(
    stopped   = { AgentExit::Stopped, 0 },
    idle      = { AgentExit::Idle, 0 },
    cancelled = { AgentExit::Cancelled, 0 },
    failed    = { AgentExit::Failed("no capacity".to_string()), 1 },
)]
fn exit_status_follows_agent_exit(exit: AgentExit, expected: u8) {
    assert_eq!(exit_status(&Ok(exit)), expected);
}

#[test]
fn agent_error_is_a_failure() {
    let err = AgentError::Storage(StorageError::InvalidId("../x".to_string()));
    assert_eq!(exit_status(&Err(err)), 1);
}
