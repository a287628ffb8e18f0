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

//! Async streaming parser implementation.
//!
//! This module provides an asynchronous streaming parser that mirrors the
//! synchronous [`StreamingParser`](crate::StreamingParser) but pulls its
//! fragments from a `futures_core::Stream`.
//!
//! # When to Use Async
//!
//! **Choose Async (`AsyncStreamingParser`) when:**
//! - Fragments arrive from a network socket or an async body stream
//! - Many documents are parsed concurrently on one runtime
//! - Working in an async runtime context
//!
//! **Choose Sync (`StreamingParser`) when:**
//! - Parsing local files or in-memory text
//! - Simpler synchronous code is preferred
//!
//! Both parsers share the same section state machine and yield identical
//! records for identical input.
//!
//! # Examples
//!
//! ## Basic Async Streaming
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use toml_stream::{AsyncStreamingParser, StreamingParserConfig};
//! use tokio::fs::File;
//!
//! let file = File::open("people.toml").await?;
//! let mut parser = AsyncStreamingParser::from_async_read_with_config(
//!     file,
//!     StreamingParserConfig::extracting("people"),
//! );
//!
//! while let Some(person) = parser.next_record().await? {
//!     println!("{}", person["name"]);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## As a Stream
//!
//! ```rust
//! # async fn example() {
//! use futures::stream::{self, StreamExt};
//! use toml_stream::AsyncStreamingParser;
//!
//! let fragments = stream::iter(["[a]\nx = ", "1\n[b]\nx = 2\n"].map(|f| Ok::<_, std::io::Error>(f.to_string())));
//! let records: Vec<_> = AsyncStreamingParser::new(fragments).collect().await;
//! assert_eq!(records.len(), 2);
//! # }
//! ```

use crate::async_reader::{AsyncLines, AsyncReadFragments};
use crate::error::{StreamError, StreamResult};
use crate::parser::{from_value, SectionPipeline, StreamingParserConfig};
use crate::reader::LineBuffer;
use futures_core::Stream;
use serde::de::DeserializeOwned;
use std::future::poll_fn;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncRead;
use toml::Value;

/// Async streaming TOML parser.
///
/// Yields the same records as [`StreamingParser`](crate::StreamingParser),
/// polling the fragment stream only when the consumer asks for a record that
/// is not ready yet. Dropping the parser drops the fragment source, so an
/// early stop releases any handle the source holds.
pub struct AsyncStreamingParser<S> {
    lines: AsyncLines<S>,
    pipeline: SectionPipeline,
    config: StreamingParserConfig,
    eof: bool,
    finished: bool,
}

impl<S, E> AsyncStreamingParser<S>
where
    S: Stream<Item = Result<String, E>> + Unpin,
    E: Into<StreamError>,
{
    /// Create an async streaming parser with default configuration.
    pub fn new(fragments: S) -> Self {
        Self::with_config(fragments, StreamingParserConfig::default())
    }

    /// Create an async streaming parser with custom configuration.
    pub fn with_config(fragments: S, config: StreamingParserConfig) -> Self {
        let buffer = LineBuffer::with_max_line_length(config.max_line_length);
        Self {
            lines: AsyncLines::with_buffer(fragments, buffer),
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

    /// Get the next record.
    ///
    /// Returns `Ok(None)` at end of input, and after an error has been
    /// returned once.
    pub async fn next_record(&mut self) -> StreamResult<Option<Value>> {
        poll_fn(|cx| Pin::new(&mut *self).poll_next(cx))
            .await
            .transpose()
    }

    /// Get the next record converted into `T`.
    pub async fn next_record_as<T: DeserializeOwned>(&mut self) -> StreamResult<Option<T>> {
        match self.next_record().await? {
            Some(value) => match from_value(value) {
                Ok(record) => Ok(Some(record)),
                Err(e) => {
                    self.finished = true;
                    Err(e)
                }
            },
            None => Ok(None),
        }
    }

    fn poll_record(&mut self, cx: &mut Context<'_>) -> Poll<StreamResult<Option<Value>>> {
        loop {
            if let Some(record) = self.pipeline.pop_ready() {
                return Poll::Ready(Ok(Some(record)));
            }
            if self.eof {
                return Poll::Ready(Ok(None));
            }
            let step = match Pin::new(&mut self.lines).poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(line))) => self.pipeline.feed_line(&line),
                Poll::Ready(Some(Err(e))) => Err(e),
                Poll::Ready(None) => {
                    self.eof = true;
                    self.pipeline.finish()
                }
            };
            if let Err(e) = step {
                return Poll::Ready(Err(e));
            }
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncStreamingParser<AsyncReadFragments<R>> {
    /// Create an async streaming parser over a tokio reader with default configuration.
    pub fn from_async_read(reader: R) -> Self {
        Self::from_async_read_with_config(reader, StreamingParserConfig::default())
    }

    /// Create an async streaming parser over a tokio reader.
    pub fn from_async_read_with_config(reader: R, config: StreamingParserConfig) -> Self {
        let fragments = AsyncReadFragments::with_capacity(reader, config.buffer_size);
        Self::with_config(fragments, config)
    }
}

impl<S, E> Stream for AsyncStreamingParser<S>
where
    S: Stream<Item = Result<String, E>> + Unpin,
    E: Into<StreamError>,
{
    type Item = StreamResult<Value>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        match this.poll_record(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(Some(record))) => Poll::Ready(Some(Ok(record))),
            Poll::Ready(Ok(None)) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Poll::Ready(Err(e)) => {
                this.finished = true;
                Poll::Ready(Some(Err(e)))
            }
        }
    }
}
