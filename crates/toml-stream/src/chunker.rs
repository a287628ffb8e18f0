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

//! Top-level section detection.
//!
//! The chunker accumulates lines into a segment and decides, one line at a
//! time, where one top-level TOML construct ends and the next begins.
//!
//! # Boundary Rules
//!
//! - The first heading line outside a multiline string fixes the start token:
//!   `[[` for documents made of arrays of tables, `[` for plain tables. It
//!   never changes afterwards.
//! - A later line is a boundary when it starts (after leading whitespace) with
//!   the start token and does not begin inside a multiline string.
//! - With token `[[`, a sub-table such as `[people.params]` is ordinary content.
//!   With token `[`, a `[[x]]` line is a boundary too, since it starts with `[`.
//! - A document that starts with `[` tables and later holds a real top-level
//!   `[[array]]` is split at every `[[array]]` entry. This is a known
//!   limitation of single-line lookahead.
//!
//! ```rust
//! use toml_stream::SectionChunker;
//!
//! let mut chunker = SectionChunker::new();
//! assert!(chunker.feed("[a]").is_none());
//! assert!(chunker.feed("x = 1").is_none());
//!
//! let segment = chunker.feed("[b]").unwrap();
//! assert_eq!(segment.text, "[a]\nx = 1");
//! assert_eq!(segment.start_line, 1);
//!
//! let last = chunker.finish().unwrap();
//! assert_eq!(last.text, "[b]");
//! assert_eq!(last.start_line, 3);
//! ```

use tracing::{debug, trace};

/// One top-level TOML construct, ready for the document parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Lines of the segment joined by `\n`.
    pub text: String,
    /// 1-based line number of the first stored line.
    pub start_line: usize,
}

/// Heading style recorded from the first heading line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartToken {
    /// `[name]` tables.
    Table,
    /// `[[name]]` arrays of tables.
    ArrayOfTables,
}

impl StartToken {
    /// Detect the heading style of a left-trimmed line.
    pub fn detect(trimmed: &str) -> Option<Self> {
        if trimmed.starts_with("[[") {
            Some(Self::ArrayOfTables)
        } else if trimmed.starts_with('[') {
            Some(Self::Table)
        } else {
            None
        }
    }

    /// The bracket text a boundary line starts with.
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "[",
            Self::ArrayOfTables => "[[",
        }
    }
}

/// Multiline string delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Basic,
    Literal,
}

impl Delimiter {
    #[inline]
    fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "\"\"\"",
            Self::Literal => "'''",
        }
    }

    /// Whether `text` contains a closing delimiter.
    fn closes_in(self, text: &str) -> bool {
        match self {
            Self::Literal => text.contains(self.as_str()),
            Self::Basic => text
                .match_indices(self.as_str())
                .any(|(at, _)| !is_escaped(text, at)),
        }
    }
}

/// Whether the byte at `at` is preceded by an odd run of backslashes.
fn is_escaped(text: &str, at: usize) -> bool {
    text[..at].bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

/// Find a multiline string opened by `line` and left open at its end.
///
/// Matches `=` followed by optional whitespace and a triple quote. A string
/// that is closed again on the same line is self-contained and ignored.
fn opened_multiline(line: &str) -> Option<Delimiter> {
    line.match_indices('=').find_map(|(eq, _)| {
        let value = line[eq + 1..].trim_start();
        let delimiter = if value.starts_with(Delimiter::Basic.as_str()) {
            Delimiter::Basic
        } else if value.starts_with(Delimiter::Literal.as_str()) {
            Delimiter::Literal
        } else {
            return None;
        };
        let body = &value[3..];
        (!delimiter.closes_in(body)).then_some(delimiter)
    })
}

/// Line-driven segment accumulator.
///
/// Feed every line with [`feed`](Self::feed) and signal end of input with
/// [`finish`](Self::finish). A boundary line always starts the next segment;
/// it is never part of the segment it closes.
#[derive(Debug, Default)]
pub struct SectionChunker {
    segment: String,
    segment_start: usize,
    line_count: usize,
    start_token: Option<StartToken>,
    multiline: Option<Delimiter>,
}

impl SectionChunker {
    /// Create an empty chunker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines fed so far.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// The recorded start token, if a heading has been seen.
    #[inline]
    pub fn start_token(&self) -> Option<StartToken> {
        self.start_token
    }

    /// Whether the last fed line left a multiline string open.
    #[inline]
    pub fn in_multiline_string(&self) -> bool {
        self.multiline.is_some()
    }

    /// Feed one line.
    ///
    /// Returns the completed segment when this line is a boundary and the
    /// current segment is non-empty.
    pub fn feed(&mut self, line: &str) -> Option<Segment> {
        let trimmed = line.trim_start();

        // A line that closes a multiline string still begins inside it.
        let began_inside = self.multiline.is_some();
        self.multiline = match self.multiline {
            None => opened_multiline(trimmed),
            Some(delimiter) if delimiter.closes_in(line) => None,
            open => open,
        };

        let completed = if !began_inside && self.is_boundary(trimmed) {
            self.take_segment()
        } else {
            None
        };
        self.append(line);
        completed
    }

    /// Signal end of input, returning the final segment if non-empty.
    pub fn finish(&mut self) -> Option<Segment> {
        self.take_segment()
    }

    fn is_boundary(&mut self, trimmed: &str) -> bool {
        if self.start_token.is_none() {
            self.start_token = StartToken::detect(trimmed);
            if let Some(token) = self.start_token {
                trace!(
                    line = self.line_count + 1,
                    token = token.as_str(),
                    "recorded start token"
                );
            }
        }
        self.start_token
            .is_some_and(|token| trimmed.starts_with(token.as_str()))
    }

    fn take_segment(&mut self) -> Option<Segment> {
        if self.segment.is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.segment);
        debug!(
            start_line = self.segment_start,
            bytes = text.len(),
            "section complete"
        );
        Some(Segment {
            text,
            start_line: self.segment_start,
        })
    }

    fn append(&mut self, line: &str) {
        self.line_count += 1;
        if self.segment.is_empty() {
            self.segment.push_str(line.trim_start());
            self.segment_start = self.line_count;
        } else {
            self.segment.push('\n');
            self.segment.push_str(line);
        }
    }
}
