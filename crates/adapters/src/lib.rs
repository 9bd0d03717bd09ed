// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hf-adapters: boundaries to the cracking binary and to remote compute

pub mod hashcat;
pub mod potfile;
pub mod provision;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use hashcat::{resolve_binary, HashcatError, HashcatJob, HashcatProcess};
pub use potfile::{parse_potfile, read_output};
pub use provision::{K8sConfig, KubernetesProvisioner, ProvisionError, Provisioner};

#[cfg(any(test, feature = "test-support"))]
pub use provision::{FakeProvisioner, ProvisionCall};
