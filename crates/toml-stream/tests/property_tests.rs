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

//! Property tests: output depends on the document, never on how it is split.

use proptest::prelude::*;
use std::io;
use toml_stream::{StreamResult, StreamingParser, StreamingParserConfig, Value};

fn split_at_sizes(s: &str, sizes: &[usize]) -> Vec<io::Result<String>> {
    let chars: Vec<char> = s.chars().collect();
    let mut out = Vec::new();
    let mut pos = 0;
    let mut i = 0;
    while pos < chars.len() {
        let size = sizes[i % sizes.len()].max(1);
        let end = (pos + size).min(chars.len());
        out.push(Ok(chars[pos..end].iter().collect()));
        pos = end;
        i += 1;
    }
    out
}

fn parse(fragments: Vec<io::Result<String>>, config: StreamingParserConfig) -> Vec<Value> {
    StreamingParser::with_config(fragments, config)
        .collect::<StreamResult<Vec<_>>>()
        .unwrap()
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    count: i64,
    note: Option<String>,
}

fn entry() -> impl Strategy<Value = Entry> {
    (
        "[a-z]{1,8}",
        -1_000_000_000i64..1_000_000_000,
        proptest::option::of("[a-zA-Z\\[\\] .]{0,20}"),
    )
        .prop_map(|(name, count, note)| Entry { name, count, note })
}

fn render_entry(out: &mut String, heading: &str, e: &Entry) {
    out.push_str(heading);
    out.push('\n');
    out.push_str(&format!("name = '{}'\ncount = {}\n", e.name, e.count));
    if let Some(note) = &e.note {
        // Multiline value whose body may look like a heading.
        out.push_str(&format!("note = \"\"\"\n[{}]\n{}\"\"\"\n", e.name, note));
    }
    out.push('\n');
}

proptest! {
    #[test]
    fn tables_yield_one_record_each(entries in prop::collection::vec(entry(), 0..12), sizes in prop::collection::vec(1usize..40, 1..6)) {
        let mut doc = String::new();
        for (i, e) in entries.iter().enumerate() {
            render_entry(&mut doc, &format!("[t{}]", i), e);
        }

        let records = parse(split_at_sizes(&doc, &sizes), StreamingParserConfig::default());

        prop_assert_eq!(records.len(), entries.len());
        for (i, (record, e)) in records.iter().zip(&entries).enumerate() {
            let key = format!("t{}", i);
            prop_assert_eq!(record[key.as_str()]["count"].as_integer(), Some(e.count));
        }
    }

    #[test]
    fn array_entries_are_independent_of_fragmentation(entries in prop::collection::vec(entry(), 1..12), sizes in prop::collection::vec(1usize..40, 1..6)) {
        let mut doc = String::new();
        for e in &entries {
            render_entry(&mut doc, "[[items]]", e);
        }
        let config = StreamingParserConfig::extracting("items");

        let whole = parse(vec![Ok(doc.clone())], config.clone());
        let split = parse(split_at_sizes(&doc, &sizes), config);

        prop_assert_eq!(&split, &whole);
        prop_assert_eq!(whole.len(), entries.len());
        for (record, e) in whole.iter().zip(&entries) {
            prop_assert_eq!(record["name"].as_str(), Some(e.name.as_str()));
        }
    }
}
