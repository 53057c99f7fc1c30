//! CLI tool for gridview - parses each line of a file as cell text and
//! outputs a JSON report
//!
//! Usage:
//!   gridview_cli <input.txt>              # Output JSON to stdout
//!   gridview_cli <input.txt> -o out.json  # Output JSON to file
//!
//! Set `RUST_LOG=gridview=debug` for parser diagnostics on stderr.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use gridview::parser::{debug_tokens, parse_tokens};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum LineReport {
    Ok {
        line: usize,
        tokens: Vec<gridview::parser::Token>,
    },
    Error {
        line: usize,
        kind: gridview::ParseErrorKind,
        message: String,
        /// One-based position of the error within the line
        column: usize,
        offset: usize,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: gridview_cli <input.txt> [-o output.json]");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = if args.len() > 3 && args[2] == "-o" {
        Some(&args[3])
    } else {
        None
    };

    let text = match fs::read_to_string(input_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error reading {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    let reports: Vec<LineReport> = text
        .lines()
        .enumerate()
        .map(|(index, line)| match parse_tokens(line) {
            Ok(tokens) => {
                tracing::debug!(line = index + 1, tokens = %debug_tokens(&tokens), "parsed");
                LineReport::Ok {
                    line: index + 1,
                    tokens,
                }
            }
            Err(err) => LineReport::Error {
                line: index + 1,
                kind: err.kind,
                message: err.message,
                column: err.column + 1,
                offset: err.offset,
            },
        })
        .collect();

    let json = match serde_json::to_string_pretty(&reports) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Written: {}", path);
        }
        None => {
            io::stdout().write_all(json.as_bytes()).unwrap();
            println!();
        }
    }
}
