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

//! Streaming TOML Parser
//!
//! This crate parses a large TOML document that arrives in arbitrary text
//! fragments and yields each top-level section as soon as it is complete,
//! without holding the whole document in memory.
//!
//! # Features
//!
//! - **Memory Efficient**: Holds one section and one partial line at a time
//! - **Iterator-based**: Standard Rust iterator interface (sync)
//! - **Async Support**: `futures_core::Stream` interface with tokio readers (optional)
//! - **Array Unwrapping**: Emit each `[[name]]` entry as its own record
//! - **Typed Records**: Deserialize records into your own types with serde
//!
//! # How Sections Are Found
//!
//! Fragments are joined into lines, and the first heading line decides the
//! document style: `[name]` tables or `[[name]]` arrays of tables. Every
//! later line starting with that bracket token, outside a multiline string,
//! closes the current section. Each section is parsed on its own by the
//! `toml` crate. Sections that hold only blank lines or comments produce no
//! record.
//!
//! # Sync vs Async
//!
//! ## Synchronous API (default)
//!
//! ```rust,no_run
//! use toml_stream::{StreamingParser, StreamingParserConfig};
//! use std::fs::File;
//!
//! let file = File::open("people.toml").unwrap();
//! let parser = StreamingParser::from_reader_with_config(
//!     file,
//!     StreamingParserConfig::extracting("people"),
//! );
//!
//! for person in parser {
//!     match person {
//!         Ok(person) => println!("{}", person["name"]),
//!         Err(e) => {
//!             eprintln!("Error: {}", e);
//!             break;
//!         }
//!     }
//! }
//! ```
//!
//! ## Asynchronous API (feature = "async")
//!
//! ```rust,no_run
//! # #[cfg(feature = "async")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use toml_stream::AsyncStreamingParser;
//! use tokio::fs::File;
//!
//! let file = File::open("config.toml").await?;
//! let mut parser = AsyncStreamingParser::from_async_read(file);
//!
//! while let Some(section) = parser.next_record().await? {
//!     println!("{}", section);
//! }
//! # Ok(())
//! # }
//! ```

mod chunker;
mod emitter;
mod error;
mod parser;
mod reader;

#[cfg(feature = "async")]
mod async_parser;
#[cfg(feature = "async")]
mod async_reader;

pub use chunker::{Segment, SectionChunker, StartToken};
pub use emitter::Emitter;
pub use error::{StreamError, StreamResult};
pub use parser::{Records, StreamingParser, StreamingParserConfig};
pub use reader::{LineBuffer, Lines, ReadFragments};

#[cfg(feature = "async")]
pub use async_parser::AsyncStreamingParser;
#[cfg(feature = "async")]
pub use async_reader::{AsyncLines, AsyncReadFragments};

/// Re-export the record types for convenience.
pub use toml::{Table, Value};
