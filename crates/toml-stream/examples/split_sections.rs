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

//! Synchronous section splitting example.
//!
//! Streams a TOML file section by section with debug logging enabled, so the
//! chunker's section boundaries show up on stderr.
//!
//! Run with: RUST_LOG=toml_stream=debug cargo run --example split_sections -- path/to/file.toml

use std::fs::File;
use toml_stream::StreamingParser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: split_sections <file.toml>");
        std::process::exit(2);
    };

    let parser = StreamingParser::from_reader(File::open(&path)?);

    let mut count = 0;
    for section in parser {
        let section = section?;
        count += 1;
        let names: Vec<&str> = section
            .as_table()
            .map(|t| t.keys().map(String::as_str).collect())
            .unwrap_or_default();
        println!("section {}: {}", count, names.join(", "));
    }

    println!("{} sections in {}", count, path);
    Ok(())
}
