//! Chart rendering: turns a result table plus metadata into a fully
//! serializable chart specification.
//!
//! The field check is strict: metadata naming a column the result lacks is
//! a catalogue bug and fails with [`AnalysisError::ChartField`] rather than
//! silently substituting columns.

use serde::Serialize;

use crate::{
    error::AnalysisError,
    model::{ChartKind, ChartMeta, ResultTable},
};

/// A renderable chart: stringified x values, numeric y values, and label
/// passthrough. Plain data throughout so it serializes to JSON without any
/// live handles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

pub fn render(result: &ResultTable, meta: &ChartMeta) -> Result<ChartSpec, AnalysisError> {
    let x_index = result
        .column_index(&meta.x_field)
        .ok_or_else(|| AnalysisError::ChartField(meta.x_field.clone()))?;
    let y_index = result
        .column_index(&meta.y_field)
        .ok_or_else(|| AnalysisError::ChartField(meta.y_field.clone()))?;

    let mut x = Vec::with_capacity(result.row_count());
    let mut y = Vec::with_capacity(result.row_count());
    for row in &result.rows {
        x.push(row.get(x_index).map(|c| c.as_display()).unwrap_or_default());
        let value = row.get(y_index).map(|c| c.as_number()).unwrap_or(0.0);
        y.push(if value.is_finite() { value } else { 0.0 });
    }

    Ok(ChartSpec {
        title: meta.title.clone(),
        kind: meta.kind,
        x_label: meta.x_field.clone(),
        y_label: meta.y_field.clone(),
        x,
        y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{COL_CATEGORY, COL_COUNT, Cell};

    fn sample_result() -> ResultTable {
        let mut result = ResultTable::new(&[COL_CATEGORY, COL_COUNT]);
        result.rows.push(vec![
            Cell::Text("ROUBO".to_string()),
            Cell::Count(4),
        ]);
        result.rows.push(vec![
            Cell::Text("DANO".to_string()),
            Cell::Count(1),
        ]);
        result
    }

    #[test]
    fn render_extracts_axes_in_row_order() {
        let meta = ChartMeta::bar("Occurrences", COL_CATEGORY, COL_COUNT);
        let spec = render(&sample_result(), &meta).unwrap();
        assert_eq!(spec.x, vec!["ROUBO", "DANO"]);
        assert_eq!(spec.y, vec![4.0, 1.0]);
        assert_eq!(spec.kind, ChartKind::Bar);
    }

    #[test]
    fn render_rejects_unknown_fields() {
        let meta = ChartMeta::bar("Occurrences", "bogus", COL_COUNT);
        let err = render(&sample_result(), &meta).unwrap_err();
        assert_eq!(err, AnalysisError::ChartField("bogus".to_string()));
    }

    #[test]
    fn empty_result_renders_empty_axes() {
        let result = ResultTable::new(&[COL_CATEGORY, COL_COUNT]);
        let meta = ChartMeta::bar("Occurrences", COL_CATEGORY, COL_COUNT);
        let spec = render(&result, &meta).unwrap();
        assert!(spec.x.is_empty());
        assert!(spec.y.is_empty());
    }

    #[test]
    fn spec_serializes_to_plain_json() {
        let meta = ChartMeta::bar("Occurrences", COL_CATEGORY, COL_COUNT);
        let spec = render(&sample_result(), &meta).unwrap();
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["kind"], "bar");
        assert_eq!(json["x"][0], "ROUBO");
        assert_eq!(json["y"][0], 4.0);
    }
}
