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

//! Basic async streaming parser example.
//!
//! Feeds a document to the async parser in small fragments, the way it would
//! arrive from a network body, and prints each entry as it completes.
//!
//! Run with: cargo run --example async_basic --features async

#[cfg(feature = "async")]
use futures::stream;
#[cfg(feature = "async")]
use toml_stream::{AsyncStreamingParser, StreamingParserConfig};

#[cfg(feature = "async")]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let input = r#"
# Deployment inventory
[[hosts]]
name = "web-1"
roles = ["http", "tls"]
motd = """
[maintenance]
Scheduled for Sunday."""

[[hosts]]
name = "db-1"
roles = ["postgres"]
  [hosts.limits]
  connections = 1_000
"#;

    println!("=== Async Streaming TOML Parser Example ===\n");

    // Simulate a network body delivering 16-byte fragments.
    let fragments: Vec<std::io::Result<String>> = input
        .as_bytes()
        .chunks(16)
        .map(|chunk| Ok(String::from_utf8_lossy(chunk).into_owned()))
        .collect();

    let mut parser = AsyncStreamingParser::with_config(
        stream::iter(fragments),
        StreamingParserConfig::extracting("hosts"),
    );

    let mut count = 0;
    while let Some(host) = parser.next_record().await? {
        count += 1;
        println!("host #{} (after line {})", count, parser.line_count());
        println!("  name:  {}", host["name"]);
        println!("  roles: {}", host["roles"]);
        if let Some(motd) = host.get("motd").and_then(|m| m.as_str()) {
            println!("  motd:  {:?}", motd);
        }
        if let Some(limits) = host.get("limits") {
            println!("  limits: {}", limits);
        }
    }

    println!("\n=== Summary ===");
    println!("Total hosts: {}", count);

    Ok(())
}

#[cfg(not(feature = "async"))]
fn main() {
    eprintln!("This example requires the 'async' feature to be enabled.");
    eprintln!("Run with: cargo run --example async_basic --features async");
}
