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

//! Streaming parser implementation.
//!
//! This module provides the synchronous streaming parser. It pulls text
//! fragments on demand, reassembles them into lines, cuts the lines into
//! top-level sections and hands each completed section to the `toml` crate.
//!
//! # Design Philosophy
//!
//! - **Memory Efficiency**: Only the current section and one partial line are held
//! - **Iterator-Based**: Standard Rust iterator interface for easy composition
//! - **Demand-Driven**: Nothing is read before the consumer asks for a record
//! - **Fail-Fast**: The first error ends the stream; earlier records stay valid
//!
//! # Basic Usage
//!
//! ```rust
//! use toml_stream::StreamingParser;
//!
//! let input = r#"
//! [person]
//! name = 'John'
//! age = 32
//!
//! [city]
//! name = 'Novosibirsk'
//! "#;
//!
//! let records: Vec<toml::Value> = StreamingParser::from_text(input)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0]["person"]["age"].as_integer(), Some(32));
//! assert_eq!(records[1]["city"]["name"].as_str(), Some("Novosibirsk"));
//! ```

use crate::chunker::{Segment, SectionChunker};
use crate::emitter::Emitter;
use crate::error::{StreamError, StreamResult};
use crate::reader::{LineBuffer, Lines, ReadFragments};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::VecDeque;
use std::io::Read;
use std::iter::Once;
use std::marker::PhantomData;
use toml::{Table, Value};
use tracing::debug;

/// Configuration options for the streaming parser.
///
/// # Examples
///
/// ## Default Configuration
///
/// ```rust
/// use toml_stream::StreamingParserConfig;
///
/// let config = StreamingParserConfig::default();
/// assert_eq!(config.extract_array, None);
/// assert_eq!(config.max_line_length, 1_000_000);
/// assert_eq!(config.buffer_size, 64 * 1024);
/// ```
///
/// ## Unwrapping an Array of Tables
///
/// ```rust
/// use toml_stream::StreamingParserConfig;
///
/// let config = StreamingParserConfig {
///     buffer_size: 8 * 1024,
///     ..StreamingParserConfig::extracting("people")
/// };
/// assert_eq!(config.extract_array.as_deref(), Some("people"));
/// ```
#[derive(Debug, Clone)]
pub struct StreamingParserConfig {
    /// Top-level key whose array elements are emitted as individual records.
    ///
    /// When set, every non-empty section must hold an array under this key,
    /// otherwise parsing fails with `StreamError::Shape`.
    ///
    /// Default: None (each section is emitted whole)
    pub extract_array: Option<String>,

    /// Maximum line length in bytes.
    ///
    /// Lines exceeding this length cause `StreamError::LineTooLong`. This
    /// bounds the memory held by an unterminated line.
    ///
    /// Default: 1,000,000 bytes (1MB)
    pub max_line_length: usize,

    /// Read buffer size used when parsing from a byte reader.
    ///
    /// Each read becomes one fragment. Has no effect on parsers built from
    /// a fragment iterator.
    ///
    /// Default: 64KB
    pub buffer_size: usize,
}

impl Default for StreamingParserConfig {
    fn default() -> Self {
        Self {
            extract_array: None,
            max_line_length: 1_000_000,
            buffer_size: 64 * 1024,
        }
    }
}

impl StreamingParserConfig {
    /// Default configuration that unwraps the array under `key`.
    pub fn extracting(key: impl Into<String>) -> Self {
        Self {
            extract_array: Some(key.into()),
            ..Self::default()
        }
    }
}

/// Parse one completed section with the `toml` crate.
pub(crate) fn parse_segment(segment: &Segment) -> StreamResult<Table> {
    toml::from_str::<Table>(&segment.text)
        .map_err(|e| StreamError::parse(segment.start_line, e.to_string()))
}

/// Convert an output record into a typed value.
pub(crate) fn from_value<T: DeserializeOwned>(value: Value) -> StreamResult<T> {
    T::deserialize(value).map_err(|e| StreamError::Deserialize {
        message: e.to_string(),
    })
}

/// Line-to-record stage shared by the sync and async parsers.
#[derive(Debug)]
pub(crate) struct SectionPipeline {
    chunker: SectionChunker,
    emitter: Emitter,
    ready: VecDeque<Value>,
}

impl SectionPipeline {
    pub(crate) fn new(config: &StreamingParserConfig) -> Self {
        Self {
            chunker: SectionChunker::new(),
            emitter: Emitter::new(config.extract_array.clone()),
            ready: VecDeque::new(),
        }
    }

    #[inline]
    pub(crate) fn pop_ready(&mut self) -> Option<Value> {
        self.ready.pop_front()
    }

    #[inline]
    pub(crate) fn line_count(&self) -> usize {
        self.chunker.line_count()
    }

    pub(crate) fn feed_line(&mut self, line: &str) -> StreamResult<()> {
        match self.chunker.feed(line) {
            Some(segment) => self.complete(segment),
            None => Ok(()),
        }
    }

    pub(crate) fn finish(&mut self) -> StreamResult<()> {
        match self.chunker.finish() {
            Some(segment) => self.complete(segment),
            None => Ok(()),
        }
    }

    fn complete(&mut self, segment: Segment) -> StreamResult<()> {
        let section = parse_segment(&segment)?;
        if section.is_empty() {
            debug!(start_line = segment.start_line, "skipping empty section");
            return Ok(());
        }
        self.ready.extend(self.emitter.emit(section)?);
        Ok(())
    }
}

/// Streaming TOML parser.
///
/// Yields one record per top-level section, or one record per array element
/// when [`StreamingParserConfig::extract_array`] is set, as soon as each
/// section is complete.
///
/// # Fragment Sources
///
/// Any iterator of `Result<String, E>` where `E: Into<StreamError>` works as
/// a source, including [`ReadFragments`] (built by
/// [`from_reader`](Self::from_reader)) and plain `io::Result<String>`
/// iterators. Fragments need not align with lines.
///
/// # Memory Characteristics
///
/// - **Per-Section**: The text of the section being accumulated
/// - **Per-Line**: The unterminated tail of the latest fragment
/// - **Output**: Records of the most recent section not yet pulled
///
/// # Examples
///
/// ## Array of Tables From a Reader
///
/// ```rust
/// use toml_stream::{StreamingParser, StreamingParserConfig};
/// use std::io::Cursor;
///
/// let input = "[[people]]\nname = 'Andrey'\n\n[[people]]\nname = 'Alisa'\n";
/// let config = StreamingParserConfig {
///     buffer_size: 8,
///     ..StreamingParserConfig::extracting("people")
/// };
///
/// let parser = StreamingParser::from_reader_with_config(Cursor::new(input), config);
/// let names: Vec<String> = parser
///     .map(|record| record.unwrap()["name"].as_str().unwrap().to_string())
///     .collect();
///
/// assert_eq!(names, vec!["Andrey", "Alisa"]);
/// ```
///
/// ## Typed Records
///
/// ```rust
/// use serde::Deserialize;
/// use toml_stream::{StreamingParser, StreamingParserConfig};
///
/// #[derive(Deserialize)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let input = "[[people]]\nname = 'Ekaterina'\nage = 8\n";
/// let people: Vec<Person> = StreamingParser::from_text_with_config(
///     input,
///     StreamingParserConfig::extracting("people"),
/// )
/// .deserialize::<Person>()
/// .collect::<Result<_, _>>()
/// .unwrap();
///
/// assert_eq!(people[0].name, "Ekaterina");
/// assert_eq!(people[0].age, 8);
/// ```
pub struct StreamingParser<I> {
    lines: Lines<I>,
    pipeline: SectionPipeline,
    config: StreamingParserConfig,
    eof: bool,
    finished: bool,
}

impl<I, E> StreamingParser<I>
where
    I: Iterator<Item = Result<String, E>>,
    E: Into<StreamError>,
{
    /// Create a streaming parser over a fragment source with default configuration.
    pub fn new<F>(fragments: F) -> Self
    where
        F: IntoIterator<IntoIter = I>,
    {
        Self::with_config(fragments, StreamingParserConfig::default())
    }

    /// Create a streaming parser over a fragment source.
    pub fn with_config<F>(fragments: F, config: StreamingParserConfig) -> Self
    where
        F: IntoIterator<IntoIter = I>,
    {
        let buffer = LineBuffer::with_max_line_length(config.max_line_length);
        Self {
            lines: Lines::with_buffer(fragments.into_iter(), buffer),
            pipeline: SectionPipeline::new(&config),
            config,
            eof: false,
            finished: false,
        }
    }

    /// The parser configuration.
    #[inline]
    pub fn config(&self) -> &StreamingParserConfig {
        &self.config
    }

    /// Number of lines consumed so far.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.pipeline.line_count()
    }

    /// Convert every record into `T`.
    ///
    /// A record that does not fit `T` ends the stream with
    /// `StreamError::Deserialize`.
    pub fn deserialize<T: DeserializeOwned>(self) -> Records<Self, T> {
        Records::new(self)
    }

    /// Pull the next record, reading only as much input as needed.
    fn next_record(&mut self) -> StreamResult<Option<Value>> {
        loop {
            if let Some(record) = self.pipeline.pop_ready() {
                return Ok(Some(record));
            }
            if self.eof {
                return Ok(None);
            }
            match self.lines.next() {
                Some(line) => self.pipeline.feed_line(&line?)?,
                None => {
                    self.eof = true;
                    self.pipeline.finish()?;
                }
            }
        }
    }
}

impl<R: Read> StreamingParser<ReadFragments<R>> {
    /// Create a streaming parser over a byte reader with default configuration.
    ///
    /// The reader is owned by the parser and dropped with it.
    pub fn from_reader(reader: R) -> Self {
        Self::from_reader_with_config(reader, StreamingParserConfig::default())
    }

    /// Create a streaming parser over a byte reader.
    pub fn from_reader_with_config(reader: R, config: StreamingParserConfig) -> Self {
        let fragments = ReadFragments::with_capacity(reader, config.buffer_size);
        Self::with_config(fragments, config)
    }
}

impl StreamingParser<Once<StreamResult<String>>> {
    /// Create a streaming parser over an in-memory document.
    pub fn from_text(text: &str) -> Self {
        Self::from_text_with_config(text, StreamingParserConfig::default())
    }

    /// Create a streaming parser over an in-memory document.
    pub fn from_text_with_config(text: &str, config: StreamingParserConfig) -> Self {
        Self::with_config(std::iter::once(Ok(text.to_string())), config)
    }
}

impl<I, E> Iterator for StreamingParser<I>
where
    I: Iterator<Item = Result<String, E>>,
    E: Into<StreamError>,
{
    type Item = StreamResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Typed view over a record iterator.
///
/// Created by [`StreamingParser::deserialize`].
pub struct Records<P, T> {
    inner: P,
    finished: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<P, T> Records<P, T> {
    fn new(inner: P) -> Self {
        Self {
            inner,
            finished: false,
            _marker: PhantomData,
        }
    }
}

impl<P, T> Iterator for Records<P, T>
where
    P: Iterator<Item = StreamResult<Value>>,
    T: for<'de> Deserialize<'de>,
{
    type Item = StreamResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.inner.next()?.and_then(from_value);
        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn collect(input: &str, config: StreamingParserConfig) -> Vec<Value> {
        StreamingParser::from_text_with_config(input, config)
            .collect::<StreamResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = StreamingParserConfig::default();
        assert_eq!(config.extract_array, None);
        assert_eq!(config.max_line_length, 1_000_000);
        assert_eq!(config.buffer_size, 64 * 1024);
    }

    #[test]
    fn test_tables_in_order() {
        let records = collect("[a]\nx = 1\n\n[b]\nx = 2\n", StreamingParserConfig::default());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["a"]["x"].as_integer(), Some(1));
        assert_eq!(records[1]["b"]["x"].as_integer(), Some(2));
        assert!(records[0].get("b").is_none());
    }

    #[test]
    fn test_extract_array() {
        let records = collect(
            "[[p]]\nname='A'\n[[p]]\nname='B'\n",
            StreamingParserConfig::extracting("p"),
        );
        let names: Vec<_> = records.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_parse_error_reports_section_start() {
        let mut parser = StreamingParser::from_text("[a]\nx = 1\n\n[b]\nx = \n");
        assert!(parser.next().unwrap().is_ok());
        let err = parser.next().unwrap().unwrap_err();
        assert!(matches!(err, StreamError::Parse { line: 4, .. }));
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_shape_error_is_terminal() {
        let mut parser = StreamingParser::from_text_with_config(
            "[[p]]\nname = 'A'\n[[q]]\nname = 'B'\n[[p]]\nname = 'C'",
            StreamingParserConfig::extracting("p"),
        );
        assert_eq!(parser.next().unwrap().unwrap()["name"].as_str(), Some("A"));
        let err = parser.next().unwrap().unwrap_err();
        assert!(matches!(err, StreamError::Shape { ref key, .. } if key == "p"));
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_empty_sections_are_skipped() {
        let records = collect("# only a comment\n\n", StreamingParserConfig::default());
        assert!(records.is_empty());
    }

    #[test]
    fn test_source_error_surfaces() {
        let source = vec![
            Ok("[a]\nx = 1\n[b]\n".to_string()),
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated")),
        ];
        let mut parser = StreamingParser::new(source);
        assert!(parser.next().unwrap().is_ok());
        assert!(matches!(parser.next(), Some(Err(StreamError::Io(_)))));
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_line_count() {
        let mut parser = StreamingParser::from_text("[a]\nx = 1\n[b]\ny = 2");
        parser.next();
        assert_eq!(parser.line_count(), 3);
        parser.next();
        assert_eq!(parser.line_count(), 4);
    }

    #[test]
    fn test_from_reader_small_buffer() {
        let config = StreamingParserConfig {
            buffer_size: 3,
            ..Default::default()
        };
        let records: Vec<_> =
            StreamingParser::from_reader_with_config(Cursor::new("[a]\nx = 1\n[b]\nx = 2"), config)
                .collect::<StreamResult<_>>()
                .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_line_too_long() {
        let config = StreamingParserConfig {
            max_line_length: 8,
            ..Default::default()
        };
        let mut parser =
            StreamingParser::from_text_with_config("[a]\nname = 'far too long'\n", config);
        assert!(matches!(
            parser.next(),
            Some(Err(StreamError::LineTooLong { line: 2, .. }))
        ));
    }

    #[test]
    fn test_deserialize_error_is_terminal() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Point {
            x: i64,
        }

        let mut records = StreamingParser::from_text_with_config(
            "p = [{ y = 1 }, { x = 2 }]",
            StreamingParserConfig::extracting("p"),
        )
        .deserialize::<Point>();
        assert!(matches!(
            records.next(),
            Some(Err(StreamError::Deserialize { .. }))
        ));
        assert!(records.next().is_none());
    }
}
