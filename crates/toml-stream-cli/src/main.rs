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

//! toml-stream command line interface

use clap::{ArgAction, Parser};
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use toml_stream_cli::error::CliError;
use toml_stream_cli::{stream_records, StreamOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Stream the top-level sections of a TOML document as JSON lines.
///
/// # Examples
///
/// ```bash
/// # One JSON object per [table]
/// toml-stream config.toml
///
/// # One JSON object per [[people]] entry, read from stdin
/// cat people.toml | toml-stream --extract people
///
/// # Count entries without printing them
/// toml-stream people.toml --extract people --count
/// ```
#[derive(Parser)]
#[command(name = "toml-stream")]
#[command(author, version, about = "Stream TOML sections as JSON lines", long_about = None)]
struct Cli {
    /// Input file (reads stdin when absent or `-`)
    file: Option<PathBuf>,

    /// Emit each entry of this array-of-tables key as its own record
    #[arg(short, long, value_name = "KEY")]
    extract: Option<String>,

    /// Bytes requested from the input per read
    #[arg(long, value_name = "N", default_value_t = 64 * 1024, value_parser = clap::value_parser!(u64).range(1..))]
    buffer_size: u64,

    /// Pretty-print each record
    #[arg(short, long)]
    pretty: bool,

    /// Print only the number of records
    #[arg(short, long, conflicts_with = "pretty")]
    count: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> StreamOptions {
        StreamOptions {
            extract: self.extract.clone(),
            buffer_size: usize::try_from(self.buffer_size).unwrap_or(usize::MAX),
            pretty: self.pretty,
            count: self.count,
        }
    }

    fn input(&self) -> Result<Box<dyn Read>, CliError> {
        match &self.file {
            Some(path) if path.as_os_str() != "-" => {
                let file = File::open(path).map_err(|e| CliError::io_error(path, e))?;
                Ok(Box::new(file))
            }
            _ => Ok(Box::new(io::stdin().lock())),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("toml_stream={level},toml_stream_cli={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let input = cli.input()?;
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let count = stream_records(input, &mut out, &cli.options())?;
    info!(records = count, "done");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_broken_pipe() => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
