//! Error taxonomy for table loading, query dispatch, and chart rendering.
//!
//! Schema problems are fatal for the table being loaded; dispatch errors are
//! caller-input problems and always recoverable by re-prompting; a chart
//! field mismatch indicates a catalogue bug rather than bad input.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// A required canonical column could not be located in the input headers.
    #[error("required column '{field}' not found in input headers")]
    MissingColumn { field: &'static str },

    /// The dispatcher received a query key that is not in the catalogue.
    #[error("unknown query '{0}'")]
    UnknownQuery(String),

    /// A parameter the query requires was absent or empty.
    #[error("query '{query}' requires parameter '{param}'")]
    MissingParameter {
        query: &'static str,
        param: &'static str,
    },

    /// A parameter was present but malformed (bad semester number, unknown
    /// period name).
    #[error("invalid value '{value}' for parameter '{param}': {reason}")]
    InvalidParameter {
        param: &'static str,
        value: String,
        reason: String,
    },

    /// Chart metadata names a column the result table does not have.
    #[error("chart field '{0}' not present in result columns")]
    ChartField(String),
}
