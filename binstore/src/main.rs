//! Store command-line tool: parse Store files and show how they were parsed.
//!
//! Usage: store [OPTIONS] <FILE>...
//!
//! Options:
//!   -d, --depth <N>        Report depth to print [default: $STORE_REPORT_DEPTH or 10]
//!   -q, --quiet            Print only the outcome line of each report
//!   -t, --to <FORMAT>      Also print each parsed value (json)
//!       --max-nesting <N>  Container nesting bound, at most 512 [default: $STORE_MAX_NESTING or 128]
//!   -h, --help             Print help
//!   -V, --version          Print version
//!
//! Every file is parsed with a fresh report. The exit status is 0 only when
//! every file was read and parsed.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;

use anyhow::Result;
use clap::{Parser as _, ValueEnum};
use libstore::{encode_json, ParseContext, Parser, ParserConfig, Value, MAX_NESTING_LIMIT};

/// Default report depth.
const DEFAULT_DEPTH: usize = 10;

/// Export format for `--to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
}

#[derive(clap::Parser, Debug)]
#[command(name = "store", version, about = "Parse Store files and report how they were parsed")]
struct Cli {
    /// Store files to parse
    #[arg(required = true)]
    files: Vec<String>,

    /// Report depth to print (default: $STORE_REPORT_DEPTH or 10)
    #[arg(short, long)]
    depth: Option<usize>,

    /// Print only the outcome line of each report
    #[arg(short, long)]
    quiet: bool,

    /// Also print each parsed value in this format
    #[arg(short, long, value_enum)]
    to: Option<Format>,

    /// Container nesting bound, at most 512 (default: $STORE_MAX_NESTING or 128)
    #[arg(long, value_parser = parse_max_nesting)]
    max_nesting: Option<usize>,
}

fn parse_max_nesting(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|e| format!("{}", e))?;
    if n > MAX_NESTING_LIMIT {
        return Err(format!("must be at most {}", MAX_NESTING_LIMIT));
    }
    Ok(n)
}

/// Report depth from STORE_REPORT_DEPTH or the default.
fn env_depth() -> usize {
    env::var("STORE_REPORT_DEPTH")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_DEPTH)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let depth = cli.depth.unwrap_or_else(env_depth);
    let config = match cli.max_nesting {
        Some(max_nesting) => ParserConfig::new(max_nesting),
        None => ParserConfig::from_env(),
    };

    let total = cli.files.len();
    let mut parser = Parser::with_config(config);
    let mut successful = 0;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (i, path) in cli.files.iter().enumerate() {
        let number = i + 1;
        let input = match fs::read_to_string(path) {
            Ok(input) => input,
            Err(e) => {
                eprintln!(
                    "Failed to read file {} out of {} from '{}': {}",
                    number, total, path, e
                );
                continue;
            }
        };

        write!(out, "Parsing file {} out of {} from '{}': ", number, total, path)?;
        let value = parser.parse(&input);

        if let Some(report) = parser.report() {
            if cli.quiet {
                writeln!(out, "{}", report.summary())?;
            } else {
                write!(out, "{}", report.render(depth))?;
            }
        }
        out.flush()?;

        let Some(value) = value else {
            if let Some(e) = parser.error_in(&ParseContext::new(Some(path))) {
                eprintln!("{}", e);
            }
            continue;
        };

        if let Some(format) = cli.to {
            if let Err(e) = export(&mut out, &value, format) {
                eprintln!("Error: {:#}", e);
                continue;
            }
        }
        successful += 1;
    }

    writeln!(
        out,
        "Successfully parsed {} out of {} file(s) ({:.2}%) overall.",
        successful,
        total,
        100.0 * successful as f64 / total as f64
    )?;
    out.flush()?;

    if successful != total {
        process::exit(1);
    }
    Ok(())
}

/// Write `value` to `out` in the requested format.
fn export(out: &mut impl Write, value: &Value, format: Format) -> Result<()> {
    match format {
        Format::Json => writeln!(out, "{}", encode_json(value))?,
    }
    out.flush()?;
    Ok(())
}
