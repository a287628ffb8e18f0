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

//! Turns parsed sections into output records.

use crate::error::{StreamError, StreamResult};
use toml::{Table, Value};

/// Converts one parsed section into zero or more output records.
///
/// Without an extraction key the section table is the record. With a key,
/// the array stored under that key is unwrapped and each element becomes a
/// record of its own.
///
/// ```rust
/// use toml_stream::Emitter;
///
/// let section: toml::Table = toml::from_str("[[p]]\nname = 'A'\n[[p]]\nname = 'B'").unwrap();
/// let records = Emitter::extracting("p").emit(section).unwrap();
///
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1]["name"].as_str(), Some("B"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Emitter {
    extract_array: Option<String>,
}

impl Emitter {
    /// Create an emitter, optionally unwrapping the array under `extract_array`.
    pub fn new(extract_array: Option<String>) -> Self {
        Self { extract_array }
    }

    /// Create an emitter that unwraps the array under `key`.
    pub fn extracting(key: impl Into<String>) -> Self {
        Self::new(Some(key.into()))
    }

    /// The configured extraction key.
    #[inline]
    pub fn extract_array(&self) -> Option<&str> {
        self.extract_array.as_deref()
    }

    /// Produce the records for one section.
    ///
    /// # Errors
    ///
    /// `StreamError::Shape` when an extraction key is configured and the
    /// section has no value under it, or the value is not an array.
    pub fn emit(&self, mut section: Table) -> StreamResult<Vec<Value>> {
        let Some(key) = self.extract_array.as_deref() else {
            return Ok(vec![Value::Table(section)]);
        };

        match section.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(StreamError::shape(key, describe(&other))),
            None => Err(StreamError::shape(key, "nothing (key is absent)")),
        }
    }
}

/// Render a value for error messages.
fn describe(value: &Value) -> String {
    format!("{} {}", value.type_str(), value)
}
