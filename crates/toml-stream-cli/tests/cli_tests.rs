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

//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::NamedTempFile;

fn toml_stream_cmd() -> Command {
    Command::cargo_bin("toml-stream").expect("Failed to find toml-stream binary")
}

fn create_temp_file(content: &str) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp file");
    fs::write(file.path(), content).expect("Failed to write temp file");
    file
}

const PEOPLE: &str = r#"
# Top comment
[[people]]
name = """
[test]"""
[people.params]
account = 546_456

[[people]]
name = 'Man'
"#;

// ===== Help and Version Tests =====

#[test]
fn test_help_output() {
    toml_stream_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stream TOML sections as JSON lines"))
        .stdout(predicate::str::contains("--extract"));
}

#[test]
fn test_version_output() {
    toml_stream_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("toml-stream"));
}

// ===== Streaming Tests =====

#[test]
fn test_tables_from_file() {
    let file = create_temp_file("[person]\nname = 'John'\nage = 32\n\n[city]\nname = 'Novosibirsk'\n");

    toml_stream_cmd()
        .arg(file.path())
        .assert()
        .success()
        .stdout("{\"person\":{\"age\":32,\"name\":\"John\"}}\n{\"city\":{\"name\":\"Novosibirsk\"}}\n");
}

#[test]
fn test_extract_from_stdin() {
    toml_stream_cmd()
        .args(["--extract", "people", "-"])
        .write_stdin(PEOPLE)
        .assert()
        .success()
        .stdout(
            "{\"name\":\"[test]\",\"params\":{\"account\":546456}}\n{\"name\":\"Man\"}\n",
        );
}

#[test]
fn test_small_buffer_matches_default() {
    let file = create_temp_file(PEOPLE);
    let expected = toml_stream_cmd()
        .args(["--extract", "people"])
        .arg(file.path())
        .output()
        .unwrap()
        .stdout;

    toml_stream_cmd()
        .args(["--extract", "people", "--buffer-size", "1"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn test_count() {
    toml_stream_cmd()
        .args(["-e", "people", "--count"])
        .write_stdin(PEOPLE)
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_pretty() {
    toml_stream_cmd()
        .arg("--pretty")
        .write_stdin("[a]\nx = 1\n")
        .assert()
        .success()
        .stdout("{\n  \"a\": {\n    \"x\": 1\n  }\n}\n");
}

#[test]
fn test_empty_input() {
    toml_stream_cmd()
        .write_stdin("# nothing here\n\n")
        .assert()
        .success()
        .stdout("");
}

// ===== Error Tests =====

#[test]
fn test_missing_file() {
    toml_stream_cmd()
        .arg("/nonexistent/file.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: I/O error"))
        .stderr(predicate::str::contains("/nonexistent/file.toml"));
}

#[test]
fn test_parse_error_keeps_earlier_records() {
    toml_stream_cmd()
        .write_stdin("[a]\nx = 1\n\n[b]\nx = = 2\n")
        .assert()
        .failure()
        .stdout("{\"a\":{\"x\":1}}\n")
        .stderr(predicate::str::contains("section starting at line 4"));
}

#[test]
fn test_shape_error() {
    toml_stream_cmd()
        .args(["--extract", "person"])
        .write_stdin("[person]\nname = 'John'\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Value for key 'person' should be an array",
        ));
}

#[test]
fn test_invalid_utf8() {
    toml_stream_cmd()
        .write_stdin(vec![b'[', b'a', b']', b'\n', b'x', b'=', 0xff, b'\n'])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid UTF-8"));
}

#[test]
fn test_zero_buffer_size_rejected() {
    toml_stream_cmd()
        .args(["--buffer-size", "0"])
        .write_stdin("[a]\n")
        .assert()
        .failure();
}

#[test]
fn test_count_conflicts_with_pretty() {
    toml_stream_cmd()
        .args(["--count", "--pretty"])
        .write_stdin("[a]\n")
        .assert()
        .failure();
}
