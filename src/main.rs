//! NACH File CLI
//!
//! Builds NACH files from CSV payment instructions and lists the entries of
//! existing NACH files as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- generate entries.csv > payments.ach
//! cargo run -- parse payments.ach > entries.csv
//! ```
//!
//! # Environment Variables
//!
//! - `NACH_IMMEDIATE_DESTINATION`, `NACH_IMMEDIATE_ORIGIN`: required by `generate`
//! - `NACH_DESTINATION_NAME`, `NACH_ORIGIN_NAME`, `NACH_REFERENCE_CODE`,
//!   `NACH_FILE_ID_MODIFIER`, `NACH_BATCH_SEQUENCE_START`: optional header values
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use nach_file::{csv_io, FileConfig, NachError, NachFile, Result};
use std::env;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        return Err(NachError::MissingArgument);
    }

    let command = args[1].as_str();
    let input_path = &args[2];

    match command {
        "generate" => generate(input_path),
        "parse" => parse(input_path),
        other => Err(NachError::UnknownCommand(other.to_string())),
    }
}

fn generate(input_path: &str) -> Result<()> {
    let config = FileConfig::from_env()?;
    let reader = BufReader::new(File::open(input_path)?);

    let mut file = csv_io::build_file(reader, config.file_options())?;
    let text = file.generate_file()?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", text)?;
    Ok(())
}

fn parse(input_path: &str) -> Result<()> {
    let file = NachFile::parse_file(input_path)?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    csv_io::write_entries(&file, handle)
}
