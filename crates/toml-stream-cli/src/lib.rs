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

//! toml-stream CLI library.
//!
//! Streams the top-level sections of a TOML document to JSON, one record per
//! line, without loading the document into memory.
//!
//! # Examples
//!
//! ```no_run
//! use toml_stream_cli::{stream_records, StreamOptions};
//! use std::fs::File;
//!
//! # fn main() -> Result<(), toml_stream_cli::error::CliError> {
//! let options = StreamOptions {
//!     extract: Some("people".to_string()),
//!     ..StreamOptions::default()
//! };
//! let file = File::open("people.toml").unwrap();
//! let written = stream_records(file, &mut std::io::stdout(), &options)?;
//! eprintln!("{} records", written);
//! # Ok(())
//! # }
//! ```

pub mod error;
mod json;

pub use json::to_json;

use error::CliError;
use std::io::{Read, Write};
use toml_stream::{StreamingParser, StreamingParserConfig};
use tracing::debug;

/// Options for a single streaming run.
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Emit each entry of this array-of-tables key as its own record.
    pub extract: Option<String>,
    /// Bytes requested from the input per read.
    pub buffer_size: usize,
    /// Pretty-print each record.
    pub pretty: bool,
    /// Print only the number of records.
    pub count: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            extract: None,
            buffer_size: StreamingParserConfig::default().buffer_size,
            pretty: false,
            count: false,
        }
    }
}

impl StreamOptions {
    fn parser_config(&self) -> StreamingParserConfig {
        StreamingParserConfig {
            extract_array: self.extract.clone(),
            buffer_size: self.buffer_size,
            ..StreamingParserConfig::default()
        }
    }
}

/// Stream every record of `input` to `out` as JSON.
///
/// Records are written as they complete, so output produced before a failing
/// section is kept. Returns the number of records.
pub fn stream_records<R: Read, W: Write>(
    input: R,
    out: &mut W,
    options: &StreamOptions,
) -> Result<usize, CliError> {
    let parser = StreamingParser::from_reader_with_config(input, options.parser_config());

    let mut count = 0;
    for record in parser {
        let record = to_json(record?);
        count += 1;
        if options.count {
            continue;
        }
        let mut line = if options.pretty {
            serde_json::to_vec_pretty(&record)?
        } else {
            serde_json::to_vec(&record)?
        };
        line.push(b'\n');
        out.write_all(&line).map_err(CliError::output)?;
    }

    if options.count {
        writeln!(out, "{}", count).map_err(CliError::output)?;
    }
    out.flush().map_err(CliError::output)?;
    debug!(records = count, "stream complete");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use toml_stream::StreamError;

    fn run(input: &str, options: &StreamOptions) -> (Result<usize, CliError>, String) {
        let mut out = Vec::new();
        let result = stream_records(input.as_bytes(), &mut out, options);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_one_json_line_per_section() {
        let (result, out) = run("[a]\nx = 1\n\n[b]\ny = 'z'\n", &StreamOptions::default());
        assert_eq!(result.unwrap(), 2);
        assert_eq!(out, "{\"a\":{\"x\":1}}\n{\"b\":{\"y\":\"z\"}}\n");
    }

    #[test]
    fn test_extract_and_count() {
        let options = StreamOptions {
            extract: Some("p".into()),
            count: true,
            ..StreamOptions::default()
        };
        let (result, out) = run("[[p]]\nn = 1\n[[p]]\nn = 2\n[[p]]\nn = 3\n", &options);
        assert_eq!(result.unwrap(), 3);
        assert_eq!(out, "3\n");
    }

    #[test]
    fn test_pretty_output() {
        let options = StreamOptions {
            pretty: true,
            ..StreamOptions::default()
        };
        let (_, out) = run("[a]\nx = 1\n", &options);
        assert_eq!(out, "{\n  \"a\": {\n    \"x\": 1\n  }\n}\n");
    }

    #[test]
    fn test_records_before_error_are_written() {
        let (result, out) = run("[a]\nx = 1\n[b]\nx = = 2\n", &StreamOptions::default());
        assert!(matches!(
            result,
            Err(CliError::Stream(StreamError::Parse { line: 3, .. }))
        ));
        assert_eq!(out, "{\"a\":{\"x\":1}}\n");
    }

    #[test]
    fn test_shape_error() {
        let options = StreamOptions {
            extract: Some("person".into()),
            ..StreamOptions::default()
        };
        let (result, out) = run("[person]\nname = 'John'\n", &options);
        assert!(matches!(result, Err(CliError::Stream(StreamError::Shape { .. }))));
        assert!(out.is_empty());
    }
}
