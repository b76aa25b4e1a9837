use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Analyze crime incident exports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Normalize a raw export into the canonical six-column CSV
    Normalize(NormalizeArgs),
    /// Run one catalogue query and emit its chart specification
    Analyze(AnalyzeArgs),
    /// List the query catalogue with labels and required parameters
    Catalogue(CatalogueArgs),
    /// List distinct categories and neighborhoods present in an export
    Vocabulary(VocabularyArgs),
}

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Input CSV export ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output canonical CSV (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Keep only rows for this year (requires a year column in the input)
    #[arg(long)]
    pub year: Option<i32>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Input CSV export ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Catalogue query key (see the `catalogue` subcommand)
    #[arg(short = 'q', long = "query")]
    pub query: String,
    /// Chart specification JSON output (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Keep only rows for this year
    #[arg(long)]
    pub year: Option<i32>,
    /// Crime category filter
    #[arg(long)]
    pub category: Option<String>,
    /// Neighborhood filter
    #[arg(long)]
    pub neighborhood: Option<String>,
    /// Semester filter (1 or 2)
    #[arg(long)]
    pub semester: Option<String>,
    /// Period-of-day filter (morning, afternoon, night)
    #[arg(long)]
    pub period: Option<String>,
    /// Print the result table to stdout instead of the chart JSON
    #[arg(long = "table")]
    pub table: bool,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct CatalogueArgs {
    /// Emit the catalogue as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct VocabularyArgs {
    /// Input CSV export ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Keep only rows for this year
    #[arg(long)]
    pub year: Option<i32>,
    /// Emit the vocabulary as JSON instead of a table
    #[arg(long)]
    pub json: bool,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
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
