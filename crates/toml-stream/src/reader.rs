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

//! Line reassembly for the streaming parser.
//!
//! Fragments arrive with no alignment to line boundaries. [`LineBuffer`] joins
//! them back into whole lines, [`Lines`] drives a buffer from a fragment
//! iterator, and [`ReadFragments`] turns any [`Read`] into a fragment source.
//!
//! This module is primarily an internal implementation detail of the streaming
//! parser, but is exposed for advanced use cases.

use crate::error::{StreamError, StreamResult};
use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

/// Reassembles arbitrary text fragments into complete lines.
///
/// Lines are split on `\n`; a `\r` directly before the terminator is dropped,
/// so `\r\n` input yields the same lines as `\n` input. The unterminated tail
/// is held back until a later fragment completes it, or until
/// [`finish`](Self::finish) flushes it as the final line.
///
/// Memory held is bounded by the longest line plus the lines split from the
/// most recent fragment that have not been popped yet.
///
/// # Examples
///
/// ```rust
/// use toml_stream::LineBuffer;
///
/// let mut buffer = LineBuffer::new();
/// buffer.push("[a]\nx = ").unwrap();
/// buffer.push("1\r\n[b]").unwrap();
/// buffer.finish();
///
/// assert_eq!(buffer.pop().as_deref(), Some("[a]"));
/// assert_eq!(buffer.pop().as_deref(), Some("x = 1"));
/// assert_eq!(buffer.pop().as_deref(), Some("[b]"));
/// assert_eq!(buffer.pop(), None);
/// ```
#[derive(Debug)]
pub struct LineBuffer {
    remaining: String,
    pending: VecDeque<String>,
    line_number: usize,
    max_line_length: usize,
    finished: bool,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    /// Create a line buffer without a line length limit.
    pub fn new() -> Self {
        Self::with_max_line_length(usize::MAX)
    }

    /// Create a line buffer that rejects lines longer than `max_line_length` bytes.
    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self {
            remaining: String::new(),
            pending: VecDeque::new(),
            line_number: 0,
            max_line_length,
            finished: false,
        }
    }

    /// Number of complete lines split so far.
    #[inline]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Append a fragment, queueing every line it completes.
    ///
    /// On `LineTooLong`, the complete lines before the offending one are
    /// already queued and can still be popped.
    pub fn push(&mut self, fragment: &str) -> StreamResult<()> {
        debug_assert!(!self.finished, "push after finish");
        // `remaining` never holds a terminator, so only new text is searched.
        let searched = self.remaining.len();
        self.remaining.push_str(fragment);

        let Some(first) = self.remaining[searched..].find('\n') else {
            return self.check_tail(self.remaining.len());
        };

        let mut rest = self.remaining.as_str();
        let mut next = Some(searched + first);
        while let Some(pos) = next {
            let line = &rest[..pos];
            let line = line.strip_suffix('\r').unwrap_or(line);
            self.line_number += 1;
            if line.len() > self.max_line_length {
                return Err(StreamError::LineTooLong {
                    line: self.line_number,
                    length: line.len(),
                    limit: self.max_line_length,
                });
            }
            self.pending.push_back(line.to_string());
            rest = &rest[pos + 1..];
            next = rest.find('\n');
        }

        let tail = rest.len();
        let consumed = self.remaining.len() - tail;
        self.remaining.drain(..consumed);
        self.check_tail(tail)
    }

    fn check_tail(&self, length: usize) -> StreamResult<()> {
        if length > self.max_line_length {
            return Err(StreamError::LineTooLong {
                line: self.line_number + 1,
                length,
                limit: self.max_line_length,
            });
        }
        Ok(())
    }

    /// Flush the unterminated tail as the final line.
    ///
    /// The final line is queued even when empty. Calling this more than once
    /// has no further effect.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.line_number += 1;
        self.pending.push_back(std::mem::take(&mut self.remaining));
    }

    /// Take the next complete line.
    #[inline]
    pub fn pop(&mut self) -> Option<String> {
        self.pending.pop_front()
    }

    /// Whether [`finish`](Self::finish) has been called.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinesState {
    Reading,
    Draining,
    Done,
}

/// Lazily turns a fragment iterator into a line iterator.
///
/// A fragment is pulled only when no complete line is queued. When the source
/// is exhausted the unterminated tail is yielded as one last line, which may
/// be empty. An over-long line is reported after the complete lines that
/// precede it in the same fragment.
///
/// ```rust
/// use toml_stream::Lines;
///
/// let fragments = vec!["na", "me = 'x'\n[t", "]\n"];
/// let lines: Vec<String> = Lines::new(fragments.into_iter().map(|f| Ok::<_, std::io::Error>(f.to_string())))
///     .collect::<Result<_, _>>()
///     .unwrap();
///
/// assert_eq!(lines, vec!["name = 'x'", "[t]", ""]);
/// ```
pub struct Lines<I> {
    fragments: I,
    buffer: LineBuffer,
    state: LinesState,
    failed: Option<StreamError>,
}

impl<I, E> Lines<I>
where
    I: Iterator<Item = Result<String, E>>,
    E: Into<StreamError>,
{
    /// Create a line iterator without a line length limit.
    pub fn new(fragments: I) -> Self {
        Self::with_buffer(fragments, LineBuffer::new())
    }

    /// Create a line iterator around an existing buffer.
    pub fn with_buffer(fragments: I, buffer: LineBuffer) -> Self {
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

impl<I, E> Iterator for Lines<I>
where
    I: Iterator<Item = Result<String, E>>,
    E: Into<StreamError>,
{
    type Item = StreamResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.state == LinesState::Done {
                return None;
            }
            if let Some(line) = self.buffer.pop() {
                return Some(Ok(line));
            }
            if self.state == LinesState::Draining {
                self.state = LinesState::Done;
                return self.failed.take().map(Err);
            }

            match self.fragments.next() {
                Some(Ok(fragment)) => {
                    if let Err(e) = self.buffer.push(&fragment) {
                        self.failed = Some(e);
                        self.state = LinesState::Draining;
                    }
                }
                Some(Err(e)) => {
                    self.state = LinesState::Done;
                    return Some(Err(e.into()));
                }
                None => {
                    self.buffer.finish();
                    self.state = LinesState::Draining;
                }
            }
        }
    }
}

/// Incremental UTF-8 decoder for byte sources.
///
/// A multi-byte sequence split across two reads is carried over and completed
/// by the next read. Invalid bytes end decoding, but the valid text before
/// them is returned first and the error is held for [`take_error`](Self::take_error).
#[derive(Debug, Default)]
pub(crate) struct Utf8Decoder {
    carry: Vec<u8>,
    offset: usize,
    error: Option<StreamError>,
}

impl Utf8Decoder {
    /// Decode the next chunk of bytes.
    ///
    /// Returns `Ok(None)` when the chunk held only the start of a character.
    pub(crate) fn decode(&mut self, bytes: &[u8]) -> StreamResult<Option<String>> {
        self.carry.extend_from_slice(bytes);

        let valid = match std::str::from_utf8(&self.carry).map(str::len) {
            Ok(len) => len,
            Err(e) => {
                if e.error_len().is_some() {
                    self.error = Some(StreamError::Utf8 {
                        offset: self.offset + e.valid_up_to(),
                        message: e.to_string(),
                    });
                    self.carry.truncate(e.valid_up_to());
                }
                e.valid_up_to()
            }
        };
        if valid == 0 {
            return self.error.take().map_or(Ok(None), Err);
        }

        let tail = self.carry.split_off(valid);
        let head = std::mem::replace(&mut self.carry, tail);
        self.offset += head.len();
        String::from_utf8(head)
            .map(Some)
            .map_err(|e| StreamError::Utf8 {
                offset: self.offset,
                message: e.to_string(),
            })
    }

    /// Take the error held back by the last [`decode`](Self::decode).
    #[inline]
    pub(crate) fn take_error(&mut self) -> Option<StreamError> {
        self.error.take()
    }

    /// Check that no partial character is left at end of input.
    pub(crate) fn finish(&self) -> StreamResult<()> {
        if self.carry.is_empty() {
            Ok(())
        } else {
            Err(StreamError::Utf8 {
                offset: self.offset,
                message: format!(
                    "incomplete {}-byte sequence at end of input",
                    self.carry.len()
                ),
            })
        }
    }
}

/// Fragment source over a [`Read`] implementation.
///
/// Each successful read becomes one fragment. The reader is owned, so
/// dropping the fragment source (or the parser holding it) releases the
/// underlying handle whether or not the input was fully consumed.
///
/// ```rust
/// use toml_stream::ReadFragments;
/// use std::io::Cursor;
///
/// let fragments: Vec<String> = ReadFragments::with_capacity(Cursor::new("abcdef"), 4)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(fragments, vec!["abcd", "ef"]);
/// ```
pub struct ReadFragments<R: Read> {
    reader: R,
    buf: Vec<u8>,
    decoder: Utf8Decoder,
    done: bool,
}

impl<R: Read> ReadFragments<R> {
    /// Create a fragment source with a 64KB read buffer.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, 64 * 1024)
    }

    /// Create a fragment source with a specific read buffer size.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            buf: vec![0; capacity.max(1)],
            decoder: Utf8Decoder::default(),
            done: false,
        }
    }
}

impl<R: Read> Iterator for ReadFragments<R> {
    type Item = StreamResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if let Some(e) = self.decoder.take_error() {
                self.done = true;
                return Some(Err(e));
            }
            let n = match self.reader.read(&mut self.buf) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(StreamError::Io(e)));
                }
            };

            if n == 0 {
                self.done = true;
                return self.decoder.finish().err().map(Err);
            }

            match self.decoder.decode(&self.buf[..n]) {
                Ok(Some(fragment)) => return Some(Ok(fragment)),
                Ok(None) => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}
