// Dweve toml-stream - Streaming TOML section parser
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use toml_stream::{StreamingParser, StreamingParserConfig};

/// Fuzz target for the streaming parser.
///
/// Feeds arbitrary bytes through both the text and reader entry points, with
/// and without an extraction key, and with a small line limit.
///
/// # Running the Fuzzer
///
/// ```bash
/// cargo install cargo-fuzz
/// cd crates/toml-stream
/// cargo fuzz run fuzz_streaming_parser -- -max_len=100000
/// ```
///
/// # Expected Behavior
///
/// - Parser never panics
/// - Invalid UTF-8 from a reader surfaces as `StreamError::Utf8`
/// - Nothing is yielded after the first error
fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    for record in StreamingParser::from_text(&input) {
        let _ = record;
    }

    let mut parser =
        StreamingParser::from_text_with_config(&input, StreamingParserConfig::extracting("items"));
    while let Some(record) = parser.next() {
        if record.is_err() {
            assert!(parser.next().is_none());
            break;
        }
    }

    let config = StreamingParserConfig {
        max_line_length: 256,
        buffer_size: 7,
        ..StreamingParserConfig::default()
    };
    for record in StreamingParser::from_reader_with_config(Cursor::new(data), config) {
        let _ = record;
    }
});
