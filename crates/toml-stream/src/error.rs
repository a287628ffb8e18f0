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

//! Error types for the streaming TOML parser.
//!
//! Every error is terminal: once the parser yields an `Err`, it yields nothing
//! further. Records produced before the failing section have already been
//! delivered and remain valid.
//!
//! # Error Categories
//!
//! - **I/O Errors**: the fragment source failed
//! - **Encoding Errors**: a byte source produced invalid UTF-8
//! - **Parse Errors**: the TOML parser rejected a completed section
//! - **Shape Errors**: the extraction key did not hold an array
//!
//! # Example
//!
//! ```rust
//! use toml_stream::{StreamError, StreamingParser, StreamingParserConfig};
//!
//! let input = "[[people]]\nname = 'Ann'\n[[people]]\nname = \n";
//! let parser = StreamingParser::from_text_with_config(
//!     input,
//!     StreamingParserConfig::extracting("people"),
//! );
//!
//! for record in parser {
//!     match record {
//!         Ok(person) => println!("{}", person),
//!         Err(StreamError::Parse { line, message }) => {
//!             eprintln!("section at line {} is invalid: {}", line, message);
//!         }
//!         Err(e) => eprintln!("{}", e),
//!     }
//! }
//! ```

use thiserror::Error;

/// Errors that can occur during streaming parsing.
///
/// Use [`line()`](Self::line) to extract a line number uniformly from the
/// variants that carry one.
///
/// ```rust
/// use toml_stream::StreamError;
///
/// let err = StreamError::parse(12, "expected `=`");
/// assert_eq!(err.line(), Some(12));
/// assert!(err.to_string().contains("line 12"));
/// ```
#[derive(Error, Debug)]
pub enum StreamError {
    /// The fragment source failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A byte source produced invalid UTF-8.
    #[error("Invalid UTF-8 at byte offset {offset}: {message}")]
    Utf8 { offset: usize, message: String },

    /// A line grew past the configured limit without a terminator.
    #[error("Line {line} exceeds maximum length: {length} bytes (limit {limit})")]
    LineTooLong {
        line: usize,
        length: usize,
        limit: usize,
    },

    /// The TOML parser rejected a section.
    ///
    /// `line` is the 1-based document line on which the section starts.
    /// `message` is the `toml` crate's report for the section text alone, so
    /// any line and column it mentions count from the section's first line.
    #[error("TOML parse error in section starting at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The extraction key was missing or did not hold an array.
    #[error("Value for key '{key}' should be an array, instead got {found}")]
    Shape { key: String, found: String },

    /// A record could not be converted into the requested type.
    #[error("Deserialization error: {message}")]
    Deserialize { message: String },
}

impl StreamError {
    /// Create a parse error.
    #[inline]
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create a shape error.
    #[inline]
    pub fn shape(key: impl Into<String>, found: impl Into<String>) -> Self {
        Self::Shape {
            key: key.into(),
            found: found.into(),
        }
    }

    /// Get the line number if available.
    #[inline]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::LineTooLong { line, .. } | Self::Parse { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_stream_error_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = StreamError::from(io_err);
        let display = format!("{}", err);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_stream_error_utf8() {
        let err = StreamError::Utf8 {
            offset: 42,
            message: "invalid byte sequence".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("Invalid UTF-8"));
        assert!(display.contains("42"));
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_stream_error_line_too_long() {
        let err = StreamError::LineTooLong {
            line: 7,
            length: 2048,
            limit: 1024,
        };
        let display = format!("{}", err);
        assert!(display.contains("Line 7"));
        assert!(display.contains("2048"));
        assert!(display.contains("1024"));
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn test_stream_error_parse() {
        let err = StreamError::parse(3, "invalid table header");
        let display = format!("{}", err);
        assert!(display.contains("line 3"));
        assert!(display.contains("invalid table header"));
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_stream_error_shape() {
        let err = StreamError::shape("people", "\"Ann\"");
        let display = format!("{}", err);
        assert!(display.contains("'people'"));
        assert!(display.contains("\"Ann\""));
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_stream_error_deserialize() {
        let err = StreamError::Deserialize {
            message: "missing field `age`".to_string(),
        };
        assert!(err.to_string().contains("missing field `age`"));
    }

    #[test]
    fn test_stream_result_alias() {
        fn fails() -> StreamResult<()> {
            Err(StreamError::parse(1, "boom"))
        }
        assert!(matches!(fails(), Err(StreamError::Parse { line: 1, .. })));
    }
}
