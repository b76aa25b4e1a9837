mod common;

use std::collections::HashMap;

use common::{incident, table_of};

use crime_lens::{
    catalogue::{Query, QueryParams},
    chart,
    model::{Cell, DANGEROUS_CATEGORIES, ENV_RESIDENCE, IncidentTable, group_contains},
};

fn params_all() -> QueryParams {
    QueryParams {
        category: Some("ROUBO".to_string()),
        neighborhood: Some("CENTRO".to_string()),
        semester: Some(1),
        period: Some(crime_lens::derive::Period::Night),
    }
}

#[test]
fn period_by_category_neighborhood_buckets_hours() {
    let table = table_of(vec![
        incident("ROUBO", "CENTRO", 14, "SEG", "RUA", "JAN"),
        incident("ROUBO", "CENTRO", 22, "TER", "RUA", "JAN"),
    ]);
    let params = QueryParams {
        category: Some("ROUBO".to_string()),
        neighborhood: Some("CENTRO".to_string()),
        ..Default::default()
    };
    let (result, _) = Query::PeriodByCategoryNeighborhood.execute(&table, &params);

    let counts: HashMap<String, u64> = result
        .rows
        .iter()
        .map(|row| {
            let Cell::Count(count) = row[1] else {
                panic!("count column should hold counts")
            };
            (row[0].as_display(), count)
        })
        .collect();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts["AFTERNOON"], 1);
    assert_eq!(counts["NIGHT"], 1);
}

#[test]
fn semester_queries_partition_dangerous_rows_without_loss() {
    let mut records = Vec::new();
    for (month, count) in [("JAN", 3), ("JUN", 2), ("JUL", 4), ("DEZ", 1)] {
        for _ in 0..count {
            records.push(incident("ROUBO", "CENTRO", 10, "SEG", "RUA", month));
        }
    }
    // Unknown month token: excluded from both semesters.
    records.push(incident("ROUBO", "CENTRO", 10, "SEG", "RUA", "???"));
    // Non-dangerous category: excluded entirely.
    records.push(incident("ESTELIONATO", "CENTRO", 10, "SEG", "RUA", "JAN"));
    let table = table_of(records);

    let run = |semester: u8| {
        let params = QueryParams {
            semester: Some(semester),
            ..Default::default()
        };
        let (result, _) = Query::DangerousBySemester.execute(&table, &params);
        result
            .rows
            .iter()
            .map(|row| {
                let Cell::Count(count) = row[1] else {
                    panic!("count column should hold counts")
                };
                (row[0].as_display(), count)
            })
            .collect::<HashMap<String, u64>>()
    };

    let first = run(1);
    let second = run(2);
    assert_eq!(first, HashMap::from([("JAN".into(), 3), ("JUN".into(), 2)]));
    assert_eq!(second, HashMap::from([("JUL".into(), 4), ("DEZ".into(), 1)]));

    let total: u64 = first.values().chain(second.values()).sum();
    let dangerous_with_valid_month = table
        .records()
        .iter()
        .filter(|r| {
            group_contains(DANGEROUS_CATEGORIES, &r.category)
                && crime_lens::derive::month_number(&r.month).is_some()
        })
        .count() as u64;
    assert_eq!(total, dangerous_with_valid_month);
}

#[test]
fn top_neighborhoods_is_capped_and_monotone() {
    let mut records = Vec::new();
    for i in 0..12 {
        let name = format!("BAIRRO {i:02}");
        for _ in 0..=i {
            records.push(incident("ROUBO", &name, 10, "SEG", "RUA", "JAN"));
        }
    }
    let table = table_of(records);
    let (result, _) = Query::TopDangerousNeighborhoods.execute(&table, &QueryParams::default());

    assert_eq!(result.row_count(), 10);
    let counts: Vec<u64> = result
        .rows
        .iter()
        .map(|row| match row[1] {
            Cell::Count(count) => count,
            _ => panic!("count column should hold counts"),
        })
        .collect();
    for pair in counts.windows(2) {
        assert!(pair[0] >= pair[1], "counts must be non-increasing: {counts:?}");
    }
    assert_eq!(counts[0], 12);
}

#[test]
fn neighborhood_ranking_truncates_to_twenty() {
    let mut records = Vec::new();
    for i in 0..25 {
        records.push(incident(
            "ROUBO",
            &format!("BAIRRO {i:02}"),
            10,
            "SEG",
            "RUA",
            "JAN",
        ));
    }
    let table = table_of(records);
    let params = QueryParams {
        category: Some("ROUBO".to_string()),
        ..Default::default()
    };
    let (result, _) = Query::NeighborhoodRankingByCategory.execute(&table, &params);
    assert_eq!(result.row_count(), 20);
}

#[test]
fn housing_queries_require_residential_environment() {
    let table = table_of(vec![
        incident("VIOLACAO DE DOMICILIO", "JARDIM", 3, "SAB", ENV_RESIDENCE, "SET"),
        incident("DANO", "JARDIM", 21, "SEX", ENV_RESIDENCE, "AGO"),
        incident("ROUBO", "JARDIM", 22, "SEG", ENV_RESIDENCE, "JAN"),
        // Same categories outside a residence must not count.
        incident("VIOLACAO DE DOMICILIO", "JARDIM", 3, "SAB", "RUA", "SET"),
        incident("ROUBO", "JARDIM", 22, "SEG", "COMERCIO", "JAN"),
    ]);
    let params = QueryParams {
        neighborhood: Some("JARDIM".to_string()),
        ..Default::default()
    };
    let (result, _) = Query::HousingByNeighborhood.execute(&table, &params);
    let total: u64 = result
        .rows
        .iter()
        .map(|row| match row[1] {
            Cell::Count(count) => count,
            _ => 0,
        })
        .sum();
    assert_eq!(total, 3);
}

#[test]
fn dominant_period_reports_one_row_per_category() {
    let table = table_of(vec![
        incident("ROUBO", "CENTRO", 22, "SEG", "RUA", "JAN"),
        incident("ROUBO", "CENTRO", 23, "TER", "RUA", "JAN"),
        incident("ROUBO", "CENTRO", 10, "QUA", "RUA", "JAN"),
        incident("FURTO SIMPLES", "CENTRO", 9, "SEG", "RUA", "JAN"),
    ]);
    let params = QueryParams {
        neighborhood: Some("CENTRO".to_string()),
        ..Default::default()
    };
    let (result, _) = Query::TheftRobberyPeriodByNeighborhood.execute(&table, &params);

    assert_eq!(result.row_count(), 2);
    // ROUBO peaks at night (2 of 3), so it sorts first.
    assert_eq!(result.rows[0][0].as_display(), "ROUBO");
    assert_eq!(result.rows[0][1].as_display(), "NIGHT");
    assert_eq!(result.rows[0][2], Cell::Count(2));
    assert_eq!(result.rows[1][0].as_display(), "FURTO SIMPLES");
    assert_eq!(result.rows[1][1].as_display(), "MORNING");
}

#[test]
fn absent_category_yields_empty_result_not_error() {
    let table = table_of(vec![incident("ROUBO", "CENTRO", 10, "SEG", "RUA", "JAN")]);
    let params = QueryParams {
        category: Some("LATROCINIO".to_string()),
        ..Default::default()
    };
    let (result, _) = Query::OccurrencesByCategory.execute(&table, &params);
    assert!(result.is_empty());
}

#[test]
fn every_query_handles_an_empty_table() {
    let table = IncidentTable::default();
    let params = params_all();
    for query in Query::ALL {
        let (result, meta) = query.execute(&table, &params);
        assert!(result.is_empty(), "{} should produce no rows", query.key());
        let spec = chart::render(&result, &meta)
            .unwrap_or_else(|err| panic!("{} chart should render: {err}", query.key()));
        assert!(spec.x.is_empty());
        assert!(spec.y.is_empty());
    }
}

#[test]
fn every_chart_meta_names_real_result_columns() {
    let table = table_of(vec![
        incident("ROUBO", "CENTRO", 14, "SEG", "COMERCIO", "JAN"),
        incident("DANO", "JARDIM", 21, "SEX", "RESIDENCIA", "AGO"),
    ]);
    let params = params_all();
    for query in Query::ALL {
        let (result, meta) = query.execute(&table, &params);
        assert!(
            chart::render(&result, &meta).is_ok(),
            "{} metadata must match its result columns",
            query.key()
        );
    }
}
