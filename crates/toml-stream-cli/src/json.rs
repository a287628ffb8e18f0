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

//! TOML to JSON value conversion.

use serde_json::{Map, Number, Value as JsonValue};
use toml_stream::Value;

/// Convert a TOML value into its JSON equivalent.
///
/// Datetimes become their RFC 3339 string form. Floats with no JSON
/// representation (`nan`, `inf`) become `null`.
pub fn to_json(value: Value) -> JsonValue {
    match value {
        Value::String(s) => JsonValue::String(s),
        Value::Integer(i) => JsonValue::Number(i.into()),
        Value::Float(f) => Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Boolean(b) => JsonValue::Bool(b),
        Value::Datetime(dt) => JsonValue::String(dt.to_string()),
        Value::Array(items) => JsonValue::Array(items.into_iter().map(to_json).collect()),
        Value::Table(table) => JsonValue::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, to_json(v)))
                .collect::<Map<_, _>>(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn convert(toml: &str) -> JsonValue {
        to_json(Value::Table(toml::from_str(toml).unwrap()))
    }

    #[test]
    fn test_scalars() {
        assert_eq!(
            convert("s = 'x'\ni = 546_456\nf = 1.5\nb = true"),
            json!({"s": "x", "i": 546456, "f": 1.5, "b": true})
        );
    }

    #[test]
    fn test_datetime_as_string() {
        assert_eq!(
            convert("at = 1979-05-27T07:32:00Z"),
            json!({"at": "1979-05-27T07:32:00Z"})
        );
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert_eq!(convert("x = nan\ny = -inf"), json!({"x": null, "y": null}));
    }

    #[test]
    fn test_nested() {
        assert_eq!(
            convert("[a]\nlist = [1, 2]\n[a.b]\nc = 'd'"),
            json!({"a": {"list": [1, 2], "b": {"c": "d"}}})
        );
    }
}
