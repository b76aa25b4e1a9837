//! Query dispatch: key resolution, required-parameter validation, and
//! defensive parameter coercion.
//!
//! The incident table is an explicit argument; there is no process-wide
//! current-dataset state. Callers own the table's lifecycle.

use log::debug;

use crate::{
    catalogue::{Param, Query, QueryParams},
    derive::Period,
    error::AnalysisError,
    model::{ChartMeta, IncidentTable, ResultTable},
};

/// Raw, caller-supplied parameters before validation. Strings may carry
/// whatever casing and whitespace the form or CLI delivered.
#[derive(Debug, Clone, Default)]
pub struct RawParams {
    pub category: Option<String>,
    pub neighborhood: Option<String>,
    pub semester: Option<String>,
    pub period: Option<String>,
}

/// Resolves a query key, validates its parameters, and runs it.
pub fn dispatch(
    name: &str,
    table: &IncidentTable,
    raw: &RawParams,
) -> Result<(ResultTable, ChartMeta), AnalysisError> {
    let query =
        Query::from_key(name.trim()).ok_or_else(|| AnalysisError::UnknownQuery(name.to_string()))?;
    let params = validate_params(query, raw)?;
    debug!("Dispatching '{}' with {params:?}", query.key());
    Ok(query.execute(table, &params))
}

/// Normalizes and coerces raw parameters for a query, enforcing that every
/// required parameter is present and non-empty.
pub fn validate_params(query: Query, raw: &RawParams) -> Result<QueryParams, AnalysisError> {
    let params = QueryParams {
        category: normalize_text(&raw.category),
        neighborhood: normalize_text(&raw.neighborhood),
        semester: parse_semester(&raw.semester)?,
        period: parse_period(&raw.period)?,
    };

    for param in query.required_params() {
        let present = match param {
            Param::Category => params.category.is_some(),
            Param::Neighborhood => params.neighborhood.is_some(),
            Param::Semester => params.semester.is_some(),
            Param::Period => params.period.is_some(),
        };
        if !present {
            return Err(AnalysisError::MissingParameter {
                query: query.key(),
                param: param.name(),
            });
        }
    }
    Ok(params)
}

/// Trim and upper-case, matching canonical table casing. Blank input counts
/// as absent.
fn normalize_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_uppercase)
}

fn parse_semester(value: &Option<String>) -> Result<Option<u8>, AnalysisError> {
    let Some(raw) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let parsed: u8 = raw.parse().map_err(|_| AnalysisError::InvalidParameter {
        param: "semester",
        value: raw.to_string(),
        reason: "expected a number".to_string(),
    })?;
    if !(1..=2).contains(&parsed) {
        return Err(AnalysisError::InvalidParameter {
            param: "semester",
            value: raw.to_string(),
            reason: "expected 1 or 2".to_string(),
        });
    }
    Ok(Some(parsed))
}

fn parse_period(value: &Option<String>) -> Result<Option<Period>, AnalysisError> {
    let Some(raw) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    Period::parse(raw)
        .map(Some)
        .ok_or_else(|| AnalysisError::InvalidParameter {
            param: "period",
            value: raw.to_string(),
            reason: "expected morning, afternoon, or night".to_string(),
        })
}
