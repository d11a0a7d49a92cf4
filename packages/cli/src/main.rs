#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the address parser.
//!
//! Parses the addresses given as arguments or, when there are none, one
//! address per line from stdin. Each parsed address is written to stdout
//! either as its canonical rendering or as a JSON line carrying the record
//! and its identity hashes. Lines that fail to parse are logged and
//! counted; they never stop the run.

use std::io::{BufRead as _, Write as _};

use address_parser::{AddressIdentity, AddressParser, AddressRecord, identify};
use clap::{Parser, ValueEnum};
use serde::Serialize;

/// Output format for parsed addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One JSON object per line.
    Json,
    /// The canonical rendering.
    Text,
}

/// Parse free-form US postal addresses.
#[derive(Parser)]
#[command(name = "address_parser")]
#[command(about = "Parse free-form US postal addresses")]
struct Cli {
    /// Addresses to parse. Reads stdin, one per line, if omitted.
    addresses: Vec<String>,

    /// City to use instead of whatever the address contains.
    #[arg(long)]
    city: Option<String>,

    /// State to use instead of whatever the address contains.
    #[arg(long)]
    state: Option<String>,

    /// Zip to use instead of whatever the address contains.
    #[arg(long)]
    zip: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    input: &'a str,
    record: &'a AddressRecord,
    identity: AddressIdentity,
}

#[derive(Debug, Default)]
struct Tally {
    parsed: usize,
    empty: usize,
    failed: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let parser = AddressParser::with_defaults()?;
    let mut out = std::io::stdout().lock();
    let mut tally = Tally::default();

    if cli.addresses.is_empty() {
        for line in std::io::stdin().lock().lines() {
            handle(&parser, &cli, &line?, &mut out, &mut tally)?;
        }
    } else {
        for address in &cli.addresses {
            handle(&parser, &cli, address, &mut out, &mut tally)?;
        }
    }

    log::info!(
        "Parsed {} address(es); {} failed, {} empty",
        tally.parsed,
        tally.failed,
        tally.empty
    );

    Ok(())
}

fn handle(
    parser: &AddressParser,
    cli: &Cli,
    input: &str,
    out: &mut impl std::io::Write,
    tally: &mut Tally,
) -> Result<(), Box<dyn std::error::Error>> {
    let record = match parser.parse_with_locality(
        input,
        cli.city.as_deref(),
        cli.state.as_deref(),
        cli.zip.as_deref(),
    ) {
        Ok(record) => record,
        Err(e) if e.is_empty_input() => {
            tally.empty += 1;
            return Ok(());
        }
        Err(e) => {
            log::warn!("Skipping {input:?}: {e}");
            tally.failed += 1;
            return Ok(());
        }
    };

    tally.parsed += 1;

    match cli.format {
        Format::Text => writeln!(out, "{record}")?,
        Format::Json => {
            let line = JsonLine {
                input,
                identity: identify(&record),
                record: &record,
            };
            writeln!(out, "{}", serde_json::to_string(&line)?)?;
        }
    }

    Ok(())
}
