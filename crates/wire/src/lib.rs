// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control API for the hashfleet daemon.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod bytes;
mod request;
mod response;
mod wire;

pub use request::{JobRef, Request};
pub use response::{ItemResult, Response};
pub use wire::{decode, encode, read_message, write_message, ProtocolError, MAX_FRAME_LEN};
pub use wire::{read_request, read_response, write_request, write_response};

/// Version exchanged in the `Hello` handshake
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod property_tests;
