// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::path::PathBuf;

#[test]
#[serial]
fn defaults_to_cluster_socket_in_state_dir() {
    std::env::remove_var("HF_DAEMON_ADDR");
    std::env::set_var("HF_STATE_DIR", "/srv/hf");

    assert_eq!(daemon_addr().unwrap(), DaemonAddr::Unix(PathBuf::from("/srv/hf/cluster.sock")));

    std::env::remove_var("HF_STATE_DIR");
}

#[test]
#[serial]
fn explicit_address_wins() {
    std::env::set_var("HF_DAEMON_ADDR", "10.0.0.5:7420");

    assert_eq!(daemon_addr().unwrap(), DaemonAddr::Tcp("10.0.0.5:7420".to_string()));

    std::env::remove_var("HF_DAEMON_ADDR");
}

#[test]
#[serial]
fn invalid_address_is_an_error() {
    std::env::set_var("HF_DAEMON_ADDR", "host:notaport");

    assert!(daemon_addr().is_err());

    std::env::remove_var("HF_DAEMON_ADDR");
}
