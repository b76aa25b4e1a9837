//! The query catalogue: a closed set of analytical operations over an
//! [`IncidentTable`], each a pure function producing a result table plus
//! chart metadata.
//!
//! Every query counts rows after a fixed filter, so the helpers here are
//! variations on count-by-key with a deterministic ordering: counts sort
//! descending with a key-ascending tie-break, except time series which
//! sort by month number. "Dominant per category" queries keep the
//! first-encountered pair when counts tie, matching row order.

use std::collections::HashMap;

use itertools::Itertools;

use crate::{
    derive::{Period, month_number, period_of_day, semester_of},
    model::{
        COL_CATEGORY, COL_COUNT, COL_ENVIRONMENT, COL_MONTH, COL_NEIGHBORHOOD, COL_PERIOD,
        COL_WEEKDAY, COMMERCE_CATEGORIES, Cell, ChartMeta, DANGEROUS_CATEGORIES,
        DOMICILE_VIOLATION, ENV_COMMERCE, ENV_RESIDENCE, IncidentRecord, IncidentTable,
        PROPERTY_DAMAGE, ResultTable, THEFT_ROBBERY_CATEGORIES, group_contains,
    },
};

/// Business hours (inclusive) for the commerce query.
pub const COMMERCE_HOURS: (i64, i64) = (8, 18);

/// Parameters a query may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    Category,
    Neighborhood,
    Semester,
    Period,
}

impl Param {
    pub fn name(&self) -> &'static str {
        match self {
            Param::Category => "category",
            Param::Neighborhood => "neighborhood",
            Param::Semester => "semester",
            Param::Period => "period",
        }
    }
}

/// Validated query parameters. String values arrive trimmed and upper-cased
/// from the dispatcher; a `None` for an optional filter means match-all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pub category: Option<String>,
    pub neighborhood: Option<String>,
    pub semester: Option<u8>,
    pub period: Option<Period>,
}

/// The full catalogue. A closed enum keeps dispatch exhaustive: adding a
/// query without wiring its key, label, parameters, and execution is a
/// compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    OccurrencesByCategory,
    NeighborhoodRankingByCategory,
    WeekdayByCategoryNeighborhood,
    PeriodByCategoryNeighborhood,
    DangerousBySemester,
    HousingBySemester,
    DangerousByNeighborhood,
    HousingByNeighborhood,
    HousingPeriodByNeighborhood,
    HousingWeekdayByNeighborhood,
    TheftRobberyPeriodByNeighborhood,
    TheftRobberyWeekdayByNeighborhood,
    DominantPeriodByNeighborhood,
    DangerousByNeighborhoodPeriod,
    CommerceByNeighborhood,
    TopDangerousNeighborhoods,
    NeighborhoodsByCategoryPeriod,
    MonthlyDangerousTrend,
    TopCategories,
    CountsByEnvironment,
}

impl Query {
    pub const ALL: [Query; 20] = [
        Query::OccurrencesByCategory,
        Query::NeighborhoodRankingByCategory,
        Query::WeekdayByCategoryNeighborhood,
        Query::PeriodByCategoryNeighborhood,
        Query::DangerousBySemester,
        Query::HousingBySemester,
        Query::DangerousByNeighborhood,
        Query::HousingByNeighborhood,
        Query::HousingPeriodByNeighborhood,
        Query::HousingWeekdayByNeighborhood,
        Query::TheftRobberyPeriodByNeighborhood,
        Query::TheftRobberyWeekdayByNeighborhood,
        Query::DominantPeriodByNeighborhood,
        Query::DangerousByNeighborhoodPeriod,
        Query::CommerceByNeighborhood,
        Query::TopDangerousNeighborhoods,
        Query::NeighborhoodsByCategoryPeriod,
        Query::MonthlyDangerousTrend,
        Query::TopCategories,
        Query::CountsByEnvironment,
    ];

    /// Stable dispatch key.
    pub fn key(&self) -> &'static str {
        match self {
            Query::OccurrencesByCategory => "occurrences_by_category",
            Query::NeighborhoodRankingByCategory => "ranking_neighborhoods_by_category",
            Query::WeekdayByCategoryNeighborhood => "weekday_by_category_neighborhood",
            Query::PeriodByCategoryNeighborhood => "period_by_category_neighborhood",
            Query::DangerousBySemester => "dangerous_by_semester",
            Query::HousingBySemester => "housing_crimes_by_semester",
            Query::DangerousByNeighborhood => "dangerous_by_neighborhood",
            Query::HousingByNeighborhood => "housing_crimes_by_neighborhood",
            Query::HousingPeriodByNeighborhood => "period_housing_by_neighborhood",
            Query::HousingWeekdayByNeighborhood => "weekday_housing_by_neighborhood",
            Query::TheftRobberyPeriodByNeighborhood => "period_theft_robbery_by_neighborhood",
            Query::TheftRobberyWeekdayByNeighborhood => "weekday_theft_robbery_by_neighborhood",
            Query::DominantPeriodByNeighborhood => "dominant_period_by_category_in_neighborhood",
            Query::DangerousByNeighborhoodPeriod => "dangerous_by_neighborhood_period",
            Query::CommerceByNeighborhood => "commerce_crimes_by_neighborhood",
            Query::TopDangerousNeighborhoods => "top10_dangerous_neighborhoods",
            Query::NeighborhoodsByCategoryPeriod => "neighborhoods_by_category_period",
            Query::MonthlyDangerousTrend => "monthly_trend_dangerous",
            Query::TopCategories => "top10_categories_overall",
            Query::CountsByEnvironment => "counts_by_environment",
        }
    }

    /// Human-readable label for presentation layers.
    pub fn label(&self) -> &'static str {
        match self {
            Query::OccurrencesByCategory => "Occurrences of a specific crime",
            Query::NeighborhoodRankingByCategory => "Neighborhood ranking for a crime",
            Query::WeekdayByCategoryNeighborhood => "Crime by weekday in a neighborhood",
            Query::PeriodByCategoryNeighborhood => "Crime by period of day in a neighborhood",
            Query::DangerousBySemester => "Dangerous crimes per month in a semester",
            Query::HousingBySemester => "Housing crimes per month in a semester",
            Query::DangerousByNeighborhood => "Dangerous crimes in a neighborhood",
            Query::HousingByNeighborhood => "Housing crimes in a neighborhood",
            Query::HousingPeriodByNeighborhood => "Housing crimes by period in a neighborhood",
            Query::HousingWeekdayByNeighborhood => "Housing crimes by weekday in a neighborhood",
            Query::TheftRobberyPeriodByNeighborhood => {
                "Dominant period per theft/robbery type in a neighborhood"
            }
            Query::TheftRobberyWeekdayByNeighborhood => {
                "Dominant weekday per theft/robbery type in a neighborhood"
            }
            Query::DominantPeriodByNeighborhood => "Dominant period per crime in a neighborhood",
            Query::DangerousByNeighborhoodPeriod => {
                "Dangerous crimes in a neighborhood and period"
            }
            Query::CommerceByNeighborhood => "Commerce crimes during business hours",
            Query::TopDangerousNeighborhoods => "Top 10 neighborhoods by occurrences",
            Query::NeighborhoodsByCategoryPeriod => "Neighborhoods for a crime and period",
            Query::MonthlyDangerousTrend => "Monthly trend of dangerous crimes",
            Query::TopCategories => "Top 10 crimes overall",
            Query::CountsByEnvironment => "Occurrences by environment",
        }
    }

    pub fn required_params(&self) -> &'static [Param] {
        match self {
            Query::OccurrencesByCategory | Query::NeighborhoodRankingByCategory => {
                &[Param::Category]
            }
            Query::WeekdayByCategoryNeighborhood | Query::PeriodByCategoryNeighborhood => {
                &[Param::Category, Param::Neighborhood]
            }
            Query::DangerousBySemester | Query::HousingBySemester => &[Param::Semester],
            Query::DangerousByNeighborhood
            | Query::HousingByNeighborhood
            | Query::HousingPeriodByNeighborhood
            | Query::HousingWeekdayByNeighborhood
            | Query::TheftRobberyPeriodByNeighborhood
            | Query::TheftRobberyWeekdayByNeighborhood
            | Query::DominantPeriodByNeighborhood
            | Query::CommerceByNeighborhood => &[Param::Neighborhood],
            Query::DangerousByNeighborhoodPeriod => &[Param::Neighborhood, Param::Period],
            Query::NeighborhoodsByCategoryPeriod => &[Param::Category, Param::Period],
            Query::TopDangerousNeighborhoods
            | Query::MonthlyDangerousTrend
            | Query::TopCategories
            | Query::CountsByEnvironment => &[],
        }
    }

    pub fn from_key(key: &str) -> Option<Query> {
        Query::ALL.into_iter().find(|q| q.key() == key)
    }

    /// Runs the query. Pure: no I/O, the table is never mutated, filters
    /// that match nothing yield an empty result.
    pub fn execute(&self, table: &IncidentTable, params: &QueryParams) -> (ResultTable, ChartMeta) {
        let records = table.records();
        match self {
            Query::OccurrencesByCategory => {
                let counts = count_by(
                    records.iter().filter(|r| matches(&params.category, &r.category)),
                    |r| r.category.clone(),
                );
                (
                    counts_table(COL_CATEGORY, counts, None),
                    ChartMeta::bar(
                        titled("Occurrences", &params.category),
                        COL_CATEGORY,
                        COL_COUNT,
                    ),
                )
            }
            Query::NeighborhoodRankingByCategory => {
                let counts = count_by(
                    records.iter().filter(|r| matches(&params.category, &r.category)),
                    |r| r.neighborhood.clone(),
                );
                (
                    counts_table(COL_NEIGHBORHOOD, counts, Some(20)),
                    ChartMeta::bar(
                        titled("Neighborhood ranking", &params.category),
                        COL_NEIGHBORHOOD,
                        COL_COUNT,
                    ),
                )
            }
            Query::WeekdayByCategoryNeighborhood => {
                let counts = count_by(
                    records.iter().filter(|r| {
                        matches(&params.category, &r.category)
                            && matches(&params.neighborhood, &r.neighborhood)
                    }),
                    |r| r.weekday.clone(),
                );
                (
                    counts_table(COL_WEEKDAY, counts, None),
                    ChartMeta::bar(
                        titled("Occurrences by weekday", &params.neighborhood),
                        COL_WEEKDAY,
                        COL_COUNT,
                    ),
                )
            }
            Query::PeriodByCategoryNeighborhood => {
                let counts = count_by(
                    records.iter().filter(|r| {
                        matches(&params.category, &r.category)
                            && matches(&params.neighborhood, &r.neighborhood)
                    }),
                    |r| period_of_day(Some(r.hour)).as_str().to_string(),
                );
                (
                    counts_table(COL_PERIOD, counts, None),
                    ChartMeta::bar(
                        titled("Occurrences by period", &params.neighborhood),
                        COL_PERIOD,
                        COL_COUNT,
                    ),
                )
            }
            Query::DangerousBySemester => {
                let counts = count_by(
                    records.iter().filter(|r| {
                        group_contains(DANGEROUS_CATEGORIES, &r.category)
                            && in_semester(&r.month, params.semester)
                    }),
                    |r| r.month.clone(),
                );
                (
                    counts_table(COL_MONTH, counts, None),
                    ChartMeta::bar(
                        semester_title("Dangerous crimes by month", params.semester),
                        COL_MONTH,
                        COL_COUNT,
                    ),
                )
            }
            Query::HousingBySemester => {
                let counts = count_by(
                    records
                        .iter()
                        .filter(|r| is_housing(r) && in_semester(&r.month, params.semester)),
                    |r| r.month.clone(),
                );
                (
                    counts_table(COL_MONTH, counts, None),
                    ChartMeta::bar(
                        semester_title("Housing crimes by month", params.semester),
                        COL_MONTH,
                        COL_COUNT,
                    ),
                )
            }
            Query::DangerousByNeighborhood => {
                let counts = count_by(
                    records.iter().filter(|r| {
                        group_contains(DANGEROUS_CATEGORIES, &r.category)
                            && matches(&params.neighborhood, &r.neighborhood)
                    }),
                    |r| r.category.clone(),
                );
                (
                    counts_table(COL_CATEGORY, counts, None),
                    ChartMeta::bar(
                        titled("Dangerous crimes", &params.neighborhood),
                        COL_CATEGORY,
                        COL_COUNT,
                    ),
                )
            }
            Query::HousingByNeighborhood => {
                let counts = count_by(
                    records
                        .iter()
                        .filter(|r| is_housing(r) && matches(&params.neighborhood, &r.neighborhood)),
                    |r| r.category.clone(),
                );
                (
                    counts_table(COL_CATEGORY, counts, None),
                    ChartMeta::bar(
                        titled("Housing crimes", &params.neighborhood),
                        COL_CATEGORY,
                        COL_COUNT,
                    ),
                )
            }
            Query::HousingPeriodByNeighborhood => {
                let counts = count_by(
                    records
                        .iter()
                        .filter(|r| is_housing(r) && matches(&params.neighborhood, &r.neighborhood)),
                    |r| period_of_day(Some(r.hour)).as_str().to_string(),
                );
                (
                    counts_table(COL_PERIOD, counts, None),
                    ChartMeta::bar(
                        titled("Housing crimes by period", &params.neighborhood),
                        COL_PERIOD,
                        COL_COUNT,
                    ),
                )
            }
            Query::HousingWeekdayByNeighborhood => {
                let counts = count_by(
                    records
                        .iter()
                        .filter(|r| is_housing(r) && matches(&params.neighborhood, &r.neighborhood)),
                    |r| r.weekday.clone(),
                );
                (
                    counts_table(COL_WEEKDAY, counts, None),
                    ChartMeta::bar(
                        titled("Housing crimes by weekday", &params.neighborhood),
                        COL_WEEKDAY,
                        COL_COUNT,
                    ),
                )
            }
            Query::TheftRobberyPeriodByNeighborhood => {
                let pairs = records
                    .iter()
                    .filter(|r| {
                        group_contains(THEFT_ROBBERY_CATEGORIES, &r.category)
                            && matches(&params.neighborhood, &r.neighborhood)
                    })
                    .map(|r| {
                        (
                            r.category.clone(),
                            period_of_day(Some(r.hour)).as_str().to_string(),
                        )
                    });
                (
                    dominant_table(COL_PERIOD, pairs),
                    ChartMeta::bar(
                        titled("Dominant theft/robbery period", &params.neighborhood),
                        COL_CATEGORY,
                        COL_COUNT,
                    ),
                )
            }
            Query::TheftRobberyWeekdayByNeighborhood => {
                let pairs = records
                    .iter()
                    .filter(|r| {
                        group_contains(THEFT_ROBBERY_CATEGORIES, &r.category)
                            && matches(&params.neighborhood, &r.neighborhood)
                    })
                    .map(|r| (r.category.clone(), r.weekday.clone()));
                (
                    dominant_table(COL_WEEKDAY, pairs),
                    ChartMeta::bar(
                        titled("Dominant theft/robbery weekday", &params.neighborhood),
                        COL_CATEGORY,
                        COL_COUNT,
                    ),
                )
            }
            Query::DominantPeriodByNeighborhood => {
                let pairs = records
                    .iter()
                    .filter(|r| matches(&params.neighborhood, &r.neighborhood))
                    .map(|r| {
                        (
                            r.category.clone(),
                            period_of_day(Some(r.hour)).as_str().to_string(),
                        )
                    });
                (
                    dominant_table(COL_PERIOD, pairs),
                    ChartMeta::bar(
                        titled("Dominant period per crime", &params.neighborhood),
                        COL_CATEGORY,
                        COL_COUNT,
                    ),
                )
            }
            Query::DangerousByNeighborhoodPeriod => {
                let counts = count_by(
                    records.iter().filter(|r| {
                        group_contains(DANGEROUS_CATEGORIES, &r.category)
                            && matches(&params.neighborhood, &r.neighborhood)
                            && params
                                .period
                                .is_none_or(|p| period_of_day(Some(r.hour)) == p)
                    }),
                    |r| r.category.clone(),
                );
                let title = match (&params.neighborhood, params.period) {
                    (Some(n), Some(p)) => format!("Dangerous crimes - {n} - {p}"),
                    _ => titled("Dangerous crimes by period", &params.neighborhood),
                };
                (
                    counts_table(COL_CATEGORY, counts, None),
                    ChartMeta::bar(title, COL_CATEGORY, COL_COUNT),
                )
            }
            Query::CommerceByNeighborhood => {
                let counts = count_by(
                    records.iter().filter(|r| {
                        group_contains(COMMERCE_CATEGORIES, &r.category)
                            && (COMMERCE_HOURS.0..=COMMERCE_HOURS.1).contains(&r.hour)
                            && r.environment == ENV_COMMERCE
                            && matches(&params.neighborhood, &r.neighborhood)
                    }),
                    |r| r.category.clone(),
                );
                (
                    counts_table(COL_CATEGORY, counts, None),
                    ChartMeta::bar(
                        titled("Commerce crimes during business hours", &params.neighborhood),
                        COL_CATEGORY,
                        COL_COUNT,
                    ),
                )
            }
            Query::TopDangerousNeighborhoods => {
                let counts = count_by(records.iter(), |r| r.neighborhood.clone());
                (
                    counts_table(COL_NEIGHBORHOOD, counts, Some(10)),
                    ChartMeta::bar(
                        "Top 10 neighborhoods by occurrences",
                        COL_NEIGHBORHOOD,
                        COL_COUNT,
                    ),
                )
            }
            Query::NeighborhoodsByCategoryPeriod => {
                let counts = count_by(
                    records.iter().filter(|r| {
                        matches(&params.category, &r.category)
                            && params
                                .period
                                .is_none_or(|p| period_of_day(Some(r.hour)) == p)
                    }),
                    |r| r.neighborhood.clone(),
                );
                let title = match (&params.category, params.period) {
                    (Some(c), Some(p)) => format!("Neighborhoods - {c} - {p}"),
                    _ => titled("Neighborhoods by crime and period", &params.category),
                };
                (
                    counts_table(COL_NEIGHBORHOOD, counts, Some(20)),
                    ChartMeta::bar(title, COL_NEIGHBORHOOD, COL_COUNT),
                )
            }
            Query::MonthlyDangerousTrend => {
                let mut by_month: HashMap<u32, u64> = HashMap::new();
                for record in records
                    .iter()
                    .filter(|r| group_contains(DANGEROUS_CATEGORIES, &r.category))
                {
                    if let Some(number) = month_number(&record.month) {
                        *by_month.entry(number).or_insert(0) += 1;
                    }
                }
                let mut result = ResultTable::new(&[COL_MONTH, COL_COUNT]);
                for (month, count) in by_month.into_iter().sorted() {
                    result
                        .rows
                        .push(vec![Cell::Text(month.to_string()), Cell::Count(count)]);
                }
                (
                    result,
                    ChartMeta::line("Monthly trend of dangerous crimes", COL_MONTH, COL_COUNT),
                )
            }
            Query::TopCategories => {
                let counts = count_by(records.iter(), |r| r.category.clone());
                (
                    counts_table(COL_CATEGORY, counts, Some(10)),
                    ChartMeta::bar("Top 10 crimes overall", COL_CATEGORY, COL_COUNT),
                )
            }
            Query::CountsByEnvironment => {
                let counts = count_by(records.iter(), |r| r.environment.clone());
                (
                    counts_table(COL_ENVIRONMENT, counts, None),
                    ChartMeta::bar("Occurrences by environment", COL_ENVIRONMENT, COL_COUNT),
                )
            }
        }
    }
}

fn matches(filter: &Option<String>, value: &str) -> bool {
    filter.as_deref().is_none_or(|wanted| wanted == value)
}

/// The housing union filter: domicile violation, property damage, or any
/// theft/robbery type, each restricted to residential settings.
fn is_housing(record: &IncidentRecord) -> bool {
    record.environment == ENV_RESIDENCE
        && (record.category == DOMICILE_VIOLATION
            || record.category == PROPERTY_DAMAGE
            || group_contains(THEFT_ROBBERY_CATEGORIES, &record.category))
}

/// A row participates in a semester query only when its month token is
/// recognized; with no semester selected every recognized month matches.
fn in_semester(month: &str, wanted: Option<u8>) -> bool {
    match (semester_of(month), wanted) {
        (Some(actual), Some(expected)) => actual == expected,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Counts rows per key and sorts count-descending, key-ascending on ties.
fn count_by<'a, I, F>(records: I, key: F) -> Vec<(String, u64)>
where
    I: Iterator<Item = &'a IncidentRecord>,
    F: Fn(&IncidentRecord) -> String,
{
    let mut counts: HashMap<String, u64> = HashMap::new();
    for record in records {
        *counts.entry(key(record)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}

fn counts_table(column: &str, counts: Vec<(String, u64)>, top: Option<usize>) -> ResultTable {
    let mut result = ResultTable::new(&[column, COL_COUNT]);
    let limit = top.unwrap_or(counts.len());
    for (key, count) in counts.into_iter().take(limit) {
        result.rows.push(vec![Cell::Text(key), Cell::Count(count)]);
    }
    result
}

/// For each category, the sub-key (period or weekday) with the highest
/// count. Ties keep the first-encountered pair in row order; the final
/// rows sort count-descending with category-ascending tie-break.
fn dominant_table(sub_column: &str, pairs: impl Iterator<Item = (String, String)>) -> ResultTable {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut counts: HashMap<(String, String), u64> = HashMap::new();
    for pair in pairs {
        if !counts.contains_key(&pair) {
            order.push(pair.clone());
        }
        *counts.entry(pair).or_insert(0) += 1;
    }

    let mut best: Vec<(String, String, u64)> = Vec::new();
    for (category, sub) in &order {
        let count = counts[&(category.clone(), sub.clone())];
        match best.iter_mut().find(|(c, _, _)| c == category) {
            Some(entry) => {
                if count > entry.2 {
                    entry.1 = sub.clone();
                    entry.2 = count;
                }
            }
            None => best.push((category.clone(), sub.clone(), count)),
        }
    }
    best.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));

    let mut result = ResultTable::new(&[COL_CATEGORY, sub_column, COL_COUNT]);
    for (category, sub, count) in best {
        result.rows.push(vec![
            Cell::Text(category),
            Cell::Text(sub),
            Cell::Count(count),
        ]);
    }
    result
}

fn titled(base: &str, filter: &Option<String>) -> String {
    match filter {
        Some(value) => format!("{base} - {value}"),
        None => base.to_string(),
    }
}

fn semester_title(base: &str, semester: Option<u8>) -> String {
    match semester {
        Some(s) => format!("{base} - semester {s}"),
        None => base.to_string(),
    }
}
