// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hf-storage: shared-storage coordination for the hashfleet cluster
//!
//! Instances and jobs agree on state through small JSON records in a shared
//! folder tree. There is no locking and no cache: every write replaces a whole
//! file and every read goes to disk.

mod atomic;
mod blobs;
mod error;
mod layout;
mod store;
mod watch;

pub use atomic::write_atomic;
pub use blobs::{BlobStore, Blobs};
pub use error::StorageError;
pub use layout::{cluster_root, JobPaths, Layout, HASHES_FILE, METADATA_FILE, OUTPUT_FILE};
pub use store::MetadataStore;
pub use watch::{classify, MetadataChange, Subscription, WatchMode};
