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

//! Async line reassembly.
//!
//! Async counterparts of [`Lines`](crate::Lines) and
//! [`ReadFragments`](crate::ReadFragments), built on `futures_core::Stream`
//! and tokio's `AsyncRead`.

use crate::error::{StreamError, StreamResult};
use crate::reader::{LineBuffer, Utf8Decoder};
use futures_core::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinesState {
    Reading,
    Draining,
    Done,
}

/// Lazily turns a fragment stream into a line stream.
///
/// The fragment source is polled only when no complete line is queued. An
/// over-long line is reported after the complete lines before it.
pub struct AsyncLines<S> {
    fragments: S,
    buffer: LineBuffer,
    state: LinesState,
    failed: Option<StreamError>,
}

impl<S, E> AsyncLines<S>
where
    S: Stream<Item = Result<String, E>> + Unpin,
    E: Into<StreamError>,
{
    /// Create a line stream without a line length limit.
    pub fn new(fragments: S) -> Self {
        Self::with_buffer(fragments, LineBuffer::new())
    }

    /// Create a line stream around an existing buffer.
    pub fn with_buffer(fragments: S, buffer: LineBuffer) -> Self {
        Self {
            fragments,
            buffer,
            state: LinesState::Reading,
            failed: None,
        }
    }

    /// Number of lines split so far.
    #[inline]
    pub fn line_number(&self) -> usize {
        self.buffer.line_number()
    }
}

impl<S, E> Stream for AsyncLines<S>
where
    S: Stream<Item = Result<String, E>> + Unpin,
    E: Into<StreamError>,
{
    type Item = StreamResult<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if this.state == LinesState::Done {
                return Poll::Ready(None);
            }
            if let Some(line) = this.buffer.pop() {
                return Poll::Ready(Some(Ok(line)));
            }
            if this.state == LinesState::Draining {
                this.state = LinesState::Done;
                return Poll::Ready(this.failed.take().map(Err));
            }

            match Pin::new(&mut this.fragments).poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(fragment))) => {
                    if let Err(e) = this.buffer.push(&fragment) {
                        this.failed = Some(e);
                        this.state = LinesState::Draining;
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    this.state = LinesState::Done;
                    return Poll::Ready(Some(Err(e.into())));
                }
                Poll::Ready(None) => {
                    this.buffer.finish();
                    this.state = LinesState::Draining;
                }
            }
        }
    }
}

/// Fragment stream over a tokio `AsyncRead`.
///
/// Each completed read becomes one fragment. The reader is owned and dropped
/// with the stream.
pub struct AsyncReadFragments<R> {
    reader: R,
    buf: Vec<u8>,
    decoder: Utf8Decoder,
    done: bool,
}

impl<R: AsyncRead + Unpin> AsyncReadFragments<R> {
    /// Create a fragment stream with a 64KB read buffer.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, 64 * 1024)
    }

    /// Create a fragment stream with a specific read buffer size.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            buf: vec![0; capacity.max(1)],
            decoder: Utf8Decoder::default(),
            done: false,
        }
    }
}

impl<R: AsyncRead + Unpin> Stream for AsyncReadFragments<R> {
    type Item = StreamResult<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        while !this.done {
            if let Some(e) = this.decoder.take_error() {
                this.done = true;
                return Poll::Ready(Some(Err(e)));
            }
            let mut read_buf = ReadBuf::new(&mut this.buf);
            match Pin::new(&mut this.reader).poll_read(cx, &mut read_buf) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(e)) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(StreamError::Io(e))));
                }
                Poll::Ready(Ok(())) => {}
            }

            let filled = read_buf.filled();
            if filled.is_empty() {
                this.done = true;
                return Poll::Ready(this.decoder.finish().err().map(Err));
            }

            match this.decoder.decode(filled) {
                Ok(Some(fragment)) => return Poll::Ready(Some(Ok(fragment))),
                Ok(None) => continue,
                Err(e) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
            }
        }
        Poll::Ready(None)
    }
}
