//! Schema normalization: locating canonical fields in arbitrarily named
//! spreadsheet columns and loading rows into an [`IncidentTable`].
//!
//! Detection is a case-insensitive substring match against a keyword list
//! per canonical field; the exports this tool handles rename and reorder
//! columns between years but keep the Portuguese field words stable.

use std::path::Path;

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use itertools::Itertools;
use log::{debug, info};

use crate::{
    derive::parse_hour,
    error::AnalysisError,
    io_utils,
    model::{IncidentRecord, IncidentTable},
};

/// The canonical fields every loaded table must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Category,
    Neighborhood,
    Hour,
    Weekday,
    Environment,
    Month,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Category,
        Field::Neighborhood,
        Field::Hour,
        Field::Weekday,
        Field::Environment,
        Field::Month,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Category => "category",
            Field::Neighborhood => "neighborhood",
            Field::Hour => "hour",
            Field::Weekday => "weekday",
            Field::Environment => "environment",
            Field::Month => "month",
        }
    }

    /// Header keywords that identify this field, upper-cased. The month
    /// column appears both with and without the circumflex across exports.
    /// Canonical names are recognized too, so `normalize` output reloads.
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Field::Category => &["NATUREZA", "CATEGORY"],
            Field::Neighborhood => &["BAIRRO", "NEIGHBORHOOD"],
            Field::Hour => &["HORA", "HOUR"],
            Field::Weekday => &["DIA", "WEEKDAY"],
            Field::Environment => &["AMBIENTE", "ENVIRONMENT"],
            Field::Month => &["MÊS", "MES", "MONTH"],
        }
    }
}

const YEAR_KEYWORD: &str = "ANO";

/// Resolved header positions for the canonical fields plus the optional
/// year column.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub category: usize,
    pub neighborhood: usize,
    pub hour: usize,
    pub weekday: usize,
    pub environment: usize,
    pub month: usize,
    pub year: Option<usize>,
}

fn detect(headers: &[String], keywords: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let name = header.trim().to_uppercase();
        keywords.iter().any(|keyword| name.contains(keyword))
    })
}

/// Locates every canonical field in the raw headers. The first header
/// containing any of a field's keywords wins.
pub fn locate_columns(headers: &[String]) -> Result<ColumnMap, AnalysisError> {
    let resolve = |field: Field| {
        detect(headers, field.keywords()).ok_or(AnalysisError::MissingColumn {
            field: field.name(),
        })
    };
    let map = ColumnMap {
        category: resolve(Field::Category)?,
        neighborhood: resolve(Field::Neighborhood)?,
        hour: resolve(Field::Hour)?,
        weekday: resolve(Field::Weekday)?,
        environment: resolve(Field::Environment)?,
        month: resolve(Field::Month)?,
        year: detect(headers, &[YEAR_KEYWORD]),
    };
    Ok(map)
}

fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

fn cell<'a>(row: &'a [String], index: usize) -> &'a str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Builds one normalized record from a decoded row. String fields are
/// trimmed and upper-cased; an unparseable hour becomes 0 by policy.
pub fn record_from_row(map: &ColumnMap, row: &[String]) -> IncidentRecord {
    IncidentRecord {
        category: normalize(cell(row, map.category)),
        neighborhood: normalize(cell(row, map.neighborhood)),
        hour: parse_hour(cell(row, map.hour)).unwrap_or(0),
        weekday: normalize(cell(row, map.weekday)),
        environment: normalize(cell(row, map.environment)),
        month: normalize(cell(row, map.month)),
    }
}

/// Loads a raw export into a canonical incident table, keeping only rows
/// matching `year` when a year column exists. Year values are compared as
/// strings since the exports store them inconsistently.
pub fn load_table(
    path: &Path,
    year: Option<i32>,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<IncidentTable> {
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)?;
    let map = locate_columns(&headers)
        .with_context(|| format!("Locating canonical columns in {path:?}"))?;
    debug!("Column map for {path:?}: {map:?}");

    let year_text = year.map(|y| y.to_string());
    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, encoding)?;
        if let (Some(expected), Some(year_col)) = (&year_text, map.year) {
            if cell(&decoded, year_col).trim() != expected {
                skipped += 1;
                continue;
            }
        }
        records.push(record_from_row(&map, &decoded));
    }

    info!(
        "Loaded {} incident(s) from '{}'{}{}",
        records.len(),
        path.display(),
        year.map(|y| format!(" for year {y}")).unwrap_or_default(),
        if skipped > 0 {
            format!(" ({skipped} row(s) outside the selected year)")
        } else {
            String::new()
        }
    );
    Ok(IncidentTable::new(records, year))
}

/// Writes a table back out as the canonical six-column CSV.
pub fn write_canonical(table: &IncidentTable, path: Option<&Path>, delimiter: u8) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(path, delimiter)?;
    writer.write_record(Field::ALL.map(|f| f.name()))?;
    for record in table.records() {
        let hour = record.hour.to_string();
        writer.write_record([
            record.category.as_str(),
            record.neighborhood.as_str(),
            hour.as_str(),
            record.weekday.as_str(),
            record.environment.as_str(),
            record.month.as_str(),
        ])?;
    }
    writer.flush().context("Flushing canonical CSV output")?;
    Ok(())
}

/// Distinct categories and neighborhoods present in a table, sorted.
/// Presentation collaborators use this to populate filter choices.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FilterVocabulary {
    pub categories: Vec<String>,
    pub neighborhoods: Vec<String>,
}

pub fn distinct_values(table: &IncidentTable) -> FilterVocabulary {
    let categories = table
        .records()
        .iter()
        .map(|r| r.category.clone())
        .filter(|c| !c.is_empty())
        .sorted()
        .dedup()
        .collect();
    let neighborhoods = table
        .records()
        .iter()
        .map(|r| r.neighborhood.clone())
        .filter(|n| !n.is_empty())
        .sorted()
        .dedup()
        .collect();
    FilterVocabulary {
        categories,
        neighborhoods,
    }
}
