// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property tests for framing and blob payload encoding.

use super::*;
use proptest::collection::vec;
use proptest::prelude::*;

proptest! {
    #[test]
    fn frames_preserve_arbitrary_payloads(payload in vec(any::<u8>(), 0..2048)) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let read_back = rt.block_on(async {
            let mut buffer = Vec::new();
            write_message(&mut buffer, &payload).await.unwrap();
            read_message(&mut std::io::Cursor::new(buffer)).await.unwrap()
        });
        prop_assert_eq!(read_back, payload);
    }

    #[test]
    fn wordlist_bytes_survive_json(content in vec(any::<u8>(), 0..512)) {
        let request = Request::CreateWordlist { content };
        let decoded: Request = decode(&encode(&request).unwrap()).unwrap();
        prop_assert_eq!(decoded, request);
    }
}
