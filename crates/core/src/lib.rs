// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hf-core: shared types for the hashfleet cluster engine

pub mod macros;

pub mod blob;
pub mod hash_type;
pub mod id;
pub mod instance;
pub mod job;
pub mod status;

pub use blob::{RuleId, WordlistId};
pub use hash_type::{HashType, HashTypeError};
pub use id::short;
pub use instance::{InstanceId, InstanceMetadata, InstanceStatus};
pub use job::{normalize_hashes, JobId, JobMetadata, JobStatus};
pub use status::{ClusterStatus, InstanceReport, JobReport};
