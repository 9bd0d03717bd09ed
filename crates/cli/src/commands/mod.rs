// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod blob;
pub mod daemon;
pub mod instance;
pub mod job;
pub mod status;
