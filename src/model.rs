//! Core data model: canonical incident records, category groups, and the
//! result/chart-metadata types every query produces.

use serde::Serialize;

/// Canonical column names used by result tables and chart metadata.
pub const COL_CATEGORY: &str = "category";
pub const COL_NEIGHBORHOOD: &str = "neighborhood";
pub const COL_WEEKDAY: &str = "weekday";
pub const COL_PERIOD: &str = "period";
pub const COL_MONTH: &str = "month";
pub const COL_ENVIRONMENT: &str = "environment";
pub const COL_COUNT: &str = "count";

/// Canonical values the union filters pivot on. The source data is a
/// Brazilian police export, so the vocabulary is Portuguese; all values are
/// upper-cased at ingest and compared exactly.
pub const DOMICILE_VIOLATION: &str = "VIOLACAO DE DOMICILIO";
pub const PROPERTY_DAMAGE: &str = "DANO";
pub const ENV_RESIDENCE: &str = "RESIDENCIA";
pub const ENV_COMMERCE: &str = "COMERCIO";

/// Higher-severity categories used by the dangerous-crime queries.
pub const DANGEROUS_CATEGORIES: &[&str] = &[
    "FURTO SIMPLES",
    "FURTO QUALIFICADO",
    "ROUBO",
    "DROGAS PARA O CONSUMO PESSOAL",
    "DANO",
    "ROUBO AGRAVADO",
    "VIOLACAO DE DOMICILIO",
    "FURTO DE COISA COMUM",
    "PORTE ILEGAL DE ARMA DE FOGO, ACESSORIO OU MUNICAO - USO PERMITIDO",
    "EXTORSAO MEDIANTE SEQUESTRO",
    "ROUBO COM RESULTADO DE LESAO CORPORAL GRAVE",
    "COMERCIO ILEGAL DE ARMA DE FOGO",
];

pub const THEFT_CATEGORIES: &[&str] =
    &["FURTO SIMPLES", "FURTO QUALIFICADO", "FURTO DE COISA COMUM"];

pub const ROBBERY_CATEGORIES: &[&str] = &[
    "ROUBO",
    "ROUBO AGRAVADO",
    "ROUBO COM RESULTADO DE LESAO CORPORAL GRAVE",
];

/// Union of [`THEFT_CATEGORIES`] and [`ROBBERY_CATEGORIES`].
pub const THEFT_ROBBERY_CATEGORIES: &[&str] = &[
    "FURTO SIMPLES",
    "FURTO QUALIFICADO",
    "FURTO DE COISA COMUM",
    "ROUBO",
    "ROUBO AGRAVADO",
    "ROUBO COM RESULTADO DE LESAO CORPORAL GRAVE",
];

/// Categories that plausibly occur against commercial premises.
pub const COMMERCE_CATEGORIES: &[&str] = &[
    "FURTO SIMPLES",
    "FURTO QUALIFICADO",
    "ROUBO",
    "DANO",
    "ROUBO AGRAVADO",
    "VIOLACAO DE DOMICILIO",
    "FURTO DE COISA COMUM",
    "ROUBO COM RESULTADO DE LESAO CORPORAL GRAVE",
];

pub fn group_contains(group: &[&str], category: &str) -> bool {
    group.iter().any(|member| *member == category)
}

/// One normalized incident row. String fields are trimmed and upper-cased at
/// ingest; `hour` is coerced to an integer with unparseable values mapped to
/// 0; `month` is the three-letter token from the export (JAN..DEZ).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentRecord {
    pub category: String,
    pub neighborhood: String,
    pub hour: i64,
    pub weekday: String,
    pub environment: String,
    pub month: String,
}

/// Ordered, immutable collection of incident records sharing one schema.
/// Queries only ever derive new tables from it.
#[derive(Debug, Clone, Default)]
pub struct IncidentTable {
    records: Vec<IncidentRecord>,
    year: Option<i32>,
}

impl IncidentTable {
    pub fn new(records: Vec<IncidentRecord>, year: Option<i32>) -> Self {
        Self { records, year }
    }

    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A single result-table cell: either a grouping key or an aggregate count.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Count(u64),
}

impl Cell {
    pub fn as_display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Count(n) => n.to_string(),
        }
    }

    /// Numeric view used by the chart renderer; non-numeric text becomes 0.
    pub fn as_number(&self) -> f64 {
        match self {
            Cell::Count(n) => *n as f64,
            Cell::Text(s) => {
                let parsed = s.trim().parse::<f64>().unwrap_or(0.0);
                if parsed.is_finite() { parsed } else { 0.0 }
            }
        }
    }
}

/// Output of a catalogue query: named columns plus rows of cells. An empty
/// table is a legitimate answer, never an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ResultTable {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows rendered to strings, for the text-table output path.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(Cell::as_display).collect())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

/// Chart metadata emitted alongside every result table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartMeta {
    pub title: String,
    pub x_field: String,
    pub y_field: String,
    pub kind: ChartKind,
}

impl ChartMeta {
    pub fn bar(title: impl Into<String>, x_field: &str, y_field: &str) -> Self {
        Self {
            title: title.into(),
            x_field: x_field.to_string(),
            y_field: y_field.to_string(),
            kind: ChartKind::Bar,
        }
    }

    pub fn line(title: impl Into<String>, x_field: &str, y_field: &str) -> Self {
        Self {
            title: title.into(),
            x_field: x_field.to_string(),
            y_field: y_field.to_string(),
            kind: ChartKind::Line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theft_robbery_is_union_of_theft_and_robbery() {
        for member in THEFT_CATEGORIES.iter().chain(ROBBERY_CATEGORIES) {
            assert!(group_contains(THEFT_ROBBERY_CATEGORIES, member));
        }
        assert_eq!(
            THEFT_ROBBERY_CATEGORIES.len(),
            THEFT_CATEGORIES.len() + ROBBERY_CATEGORIES.len()
        );
    }

    #[test]
    fn group_membership_is_exact_match() {
        assert!(group_contains(DANGEROUS_CATEGORIES, "ROUBO"));
        assert!(!group_contains(DANGEROUS_CATEGORIES, "roubo"));
        assert!(!group_contains(DANGEROUS_CATEGORIES, "ROUBO "));
    }

    #[test]
    fn cell_number_coerces_non_numeric_to_zero() {
        assert_eq!(Cell::Count(7).as_number(), 7.0);
        assert_eq!(Cell::Text("12".into()).as_number(), 12.0);
        assert_eq!(Cell::Text("CENTRO".into()).as_number(), 0.0);
        assert_eq!(Cell::Text("NaN".into()).as_number(), 0.0);
    }

    #[test]
    fn result_table_column_lookup() {
        let table = ResultTable::new(&[COL_CATEGORY, COL_COUNT]);
        assert_eq!(table.column_index(COL_CATEGORY), Some(0));
        assert_eq!(table.column_index(COL_COUNT), Some(1));
        assert_eq!(table.column_index("missing"), None);
        assert!(table.is_empty());
    }
}
