pub mod catalogue;
pub mod chart;
pub mod cli;
pub mod derive;
pub mod dispatch;
pub mod error;
pub mod ingest;
pub mod io_utils;
pub mod model;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};
use serde_json::json;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("crime_lens", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Normalize(args) => handle_normalize(&args),
        Commands::Analyze(args) => handle_analyze(&args),
        Commands::Catalogue(args) => handle_catalogue(&args),
        Commands::Vocabulary(args) => handle_vocabulary(&args),
    }
}

fn handle_normalize(args: &cli::NormalizeArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let table = ingest::load_table(&args.input, args.year, delimiter, encoding)
        .with_context(|| format!("Loading incidents from {:?}", args.input))?;
    ingest::write_canonical(&table, args.output.as_deref(), delimiter)
        .context("Writing canonical CSV")?;
    info!(
        "Wrote {} canonical row(s) to {}",
        table.len(),
        args.output
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".into())
    );
    Ok(())
}

fn handle_analyze(args: &cli::AnalyzeArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let table = ingest::load_table(&args.input, args.year, delimiter, encoding)
        .with_context(|| format!("Loading incidents from {:?}", args.input))?;

    let raw = dispatch::RawParams {
        category: args.category.clone(),
        neighborhood: args.neighborhood.clone(),
        semester: args.semester.clone(),
        period: args.period.clone(),
    };
    let (result, meta) = dispatch::dispatch(&args.query, &table, &raw)
        .with_context(|| format!("Running query '{}'", args.query))?;
    info!(
        "Query '{}' produced {} row(s)",
        args.query,
        result.row_count()
    );

    if args.table {
        table::print_table(&result.columns, &result.display_rows());
        return Ok(());
    }

    let spec = chart::render(&result, &meta).context("Rendering chart specification")?;
    let mut rendered =
        serde_json::to_string_pretty(&spec).context("Serializing chart specification")?;
    rendered.push('\n');
    io_utils::write_output(args.output.as_deref(), &rendered)
}

fn handle_catalogue(args: &cli::CatalogueArgs) -> Result<()> {
    let entries = catalogue::Query::ALL;
    if args.json {
        let listed = entries
            .iter()
            .map(|query| {
                json!({
                    "key": query.key(),
                    "label": query.label(),
                    "required_params": query
                        .required_params()
                        .iter()
                        .map(|p| p.name())
                        .collect::<Vec<_>>(),
                })
            })
            .collect::<Vec<_>>();
        let mut rendered = serde_json::to_string_pretty(&listed)?;
        rendered.push('\n');
        io_utils::write_output(None, &rendered)
    } else {
        let headers = ["key", "label", "required params"]
            .map(String::from)
            .to_vec();
        let rows = entries
            .iter()
            .map(|query| {
                vec![
                    query.key().to_string(),
                    query.label().to_string(),
                    query
                        .required_params()
                        .iter()
                        .map(|p| p.name())
                        .collect::<Vec<_>>()
                        .join(", "),
                ]
            })
            .collect::<Vec<_>>();
        table::print_table(&headers, &rows);
        Ok(())
    }
}

fn handle_vocabulary(args: &cli::VocabularyArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let table = ingest::load_table(&args.input, args.year, delimiter, encoding)
        .with_context(|| format!("Loading incidents from {:?}", args.input))?;
    let vocabulary = ingest::distinct_values(&table);
    if args.json {
        let mut rendered = serde_json::to_string_pretty(&vocabulary)?;
        rendered.push('\n');
        io_utils::write_output(None, &rendered)
    } else {
        let headers = ["kind", "value"].map(String::from).to_vec();
        let mut rows = Vec::new();
        for category in &vocabulary.categories {
            rows.push(vec!["category".to_string(), category.clone()]);
        }
        for neighborhood in &vocabulary.neighborhoods {
            rows.push(vec!["neighborhood".to_string(), neighborhood.clone()]);
        }
        table::print_table(&headers, &rows);
        Ok(())
    }
}
