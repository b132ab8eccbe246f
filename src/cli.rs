use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Data-quality workflow client for CSV checking services", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload a CSV file, run the remote check pass, and render the results
    Check(CheckArgs),
    /// Validate an expected schema against the detected structure
    Validate(ValidateArgs),
    /// Fill null values remotely and download the remediated CSV
    Fill(FillArgs),
    /// Export the detected schema as an expected-schema JSON document
    Schema(SchemaArgs),
    /// List per-row anomaly scores
    Scores(ScoresArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Input CSV file to upload
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Base URL of the checking service
    #[arg(short = 's', long = "server")]
    pub server: String,
    /// Reveal every anomaly page instead of only the first
    #[arg(long)]
    pub all: bool,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Input CSV file to upload
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Base URL of the checking service
    #[arg(short = 's', long = "server")]
    pub server: String,
    /// Expected-schema JSON file (defaults to the detected schema)
    #[arg(long = "schema")]
    pub schema: Option<PathBuf>,
    /// Repeatable expected-type overrides such as `name:str`
    #[arg(short = 'c', long = "column", action = clap::ArgAction::Append)]
    pub columns: Vec<String>,
}

#[derive(Debug, Args)]
pub struct FillArgs {
    /// Input CSV file to upload
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Base URL of the checking service
    #[arg(short = 's', long = "server")]
    pub server: String,
    /// Repeatable replacement values such as `age=0`
    #[arg(long = "set", action = clap::ArgAction::Append)]
    pub set: Vec<String>,
    /// Destination path for the remediated CSV
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Input CSV file to upload
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Base URL of the checking service
    #[arg(short = 's', long = "server")]
    pub server: String,
    /// Destination .json path for the exported schema
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct ScoresArgs {
    /// Input CSV file to upload
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Base URL of the checking service
    #[arg(short = 's', long = "server")]
    pub server: String,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
