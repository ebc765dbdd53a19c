//! Integration tests for the full analysis pipeline

use pretty_assertions::assert_eq;
use schemavet_core::{
    Analysis, Column, ColumnType, Config, Index, IndexColumnStatistic, Severity, Snapshot, Table,
};
use schemavet_engine::Orchestrator;

/// A snapshot with a healthy large table, a neglected empty table, and a
/// medium table carrying overlapping unselective indexes.
fn mixed_snapshot() -> Snapshot {
    let users = Table::new("shop", "users", 250_000)
        .with_engine("InnoDB")
        .with_column(Column::new("id", ColumnType::Int).with_cardinality(250_000))
        .with_column(
            Column::new("email", ColumnType::String { max_length: Some(255) })
                .with_cardinality(250_000),
        )
        .with_column(
            Column::new("status", ColumnType::String { max_length: Some(16) })
                .with_cardinality(5),
        )
        .with_index(
            Index::new("PRIMARY")
                .with_unique(true)
                .with_column(IndexColumnStatistic::new("id", 1).with_cardinality(250_000)),
        )
        .with_index(
            Index::new("idx_email")
                .with_column(IndexColumnStatistic::new("email", 1).with_cardinality(250_000)),
        )
        .with_index(
            Index::new("idx_status")
                .with_column(IndexColumnStatistic::new("status", 1).with_cardinality(5)),
        );

    let order = Table::new("shop", "order", 0)
        .with_column(Column::new("key", ColumnType::Int));

    let line_items = Table::new("shop", "line_items", 5_000)
        .with_column(Column::new("id", ColumnType::Int).with_cardinality(5_000))
        .with_column(Column::new("order_id", ColumnType::Int).with_cardinality(900))
        .with_column(
            Column::new("sku", ColumnType::String { max_length: Some(32) })
                .with_cardinality(3_000),
        )
        .with_index(
            Index::new("PRIMARY")
                .with_unique(true)
                .with_column(IndexColumnStatistic::new("id", 1).with_cardinality(5_000)),
        )
        .with_index(
            Index::new("idx_order")
                .with_column(IndexColumnStatistic::new("order_id", 1).with_cardinality(900)),
        )
        .with_index(
            Index::new("idx_order_sku")
                .with_column(IndexColumnStatistic::new("order_id", 1).with_cardinality(900))
                .with_column(IndexColumnStatistic::new("sku", 2).with_cardinality(3_000)),
        );

    Snapshot::from_tables(vec![users, order, line_items])
}

fn analyze(snapshot: &Snapshot) -> Analysis {
    let orchestrator = Orchestrator::with_default_checks(&Config::default());
    Analysis::from_reports(orchestrator.run(snapshot).unwrap())
}

#[test]
fn full_analysis_of_a_mixed_snapshot() {
    let snapshot = mixed_snapshot();
    let analysis = analyze(&snapshot);

    let mut flagged: Vec<(String, String, Severity)> = analysis
        .reports
        .iter()
        .filter(|r| r.flagged())
        .map(|r| (r.check.clone(), r.entity.to_string(), r.severity))
        .collect();
    flagged.sort();

    assert_eq!(
        flagged,
        vec![
            (
                "empty_table".to_string(),
                "shop.order".to_string(),
                Severity::Concern
            ),
            (
                "index_prefix".to_string(),
                "shop.users (index idx_email)".to_string(),
                Severity::Concern
            ),
            (
                "low_cardinality".to_string(),
                "shop.line_items (index idx_order)".to_string(),
                Severity::Concern
            ),
            (
                "low_cardinality".to_string(),
                "shop.line_items (index idx_order_sku)".to_string(),
                Severity::Concern
            ),
            (
                "low_cardinality".to_string(),
                "shop.users (index idx_status)".to_string(),
                Severity::Warning
            ),
            (
                "missing_primary_key".to_string(),
                "shop.order".to_string(),
                Severity::Critical
            ),
            (
                "redundant_index".to_string(),
                "shop.line_items (index idx_order)".to_string(),
                Severity::Concern
            ),
            (
                "reserved_keywords".to_string(),
                "shop.order".to_string(),
                Severity::Concern
            ),
            (
                "reserved_keywords".to_string(),
                "shop.order.key".to_string(),
                Severity::Concern
            ),
        ]
    );

    // Every supported (entity, check) pair produced a report, OK included:
    // 9 table pairs, 7 column pairs, 18 index pairs.
    assert_eq!(analysis.summary.total, 34);
    assert_eq!(analysis.summary.ok, 25);
    assert_eq!(analysis.summary.concerns, 7);
    assert_eq!(analysis.summary.warnings, 1);
    assert_eq!(analysis.summary.critical, 1);
    assert_eq!(analysis.worst(), Severity::Critical);
}

#[test]
fn analysis_round_trips_through_json() {
    let analysis = analyze(&mixed_snapshot());

    let json = analysis.to_json().unwrap();
    let parsed: Analysis = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, analysis);
}

#[test]
fn findings_group_by_owning_table() {
    let analysis = analyze(&mixed_snapshot());
    let groups = analysis.by_table();

    let keys: Vec<&String> = groups.keys().collect();
    assert_eq!(keys, vec!["shop.line_items", "shop.order", "shop.users"]);

    assert_eq!(groups["shop.users"].len(), 15);
    assert_eq!(groups["shop.order"].len(), 4);
    assert_eq!(groups["shop.line_items"].len(), 15);
}

#[test]
fn progress_walks_every_pair_in_order() {
    let snapshot = mixed_snapshot();
    let orchestrator = Orchestrator::with_default_checks(&Config::default());

    let mut steps = Vec::new();
    orchestrator
        .run_with_progress(&snapshot, |progress| {
            assert_eq!(progress.total, 96);
            steps.push(progress.step);
        })
        .unwrap();

    // 16 entities times 6 checks.
    assert_eq!(steps.len(), 96);
    assert_eq!(steps.first(), Some(&1));
    assert_eq!(steps.last(), Some(&96));
}

#[test]
fn ignore_patterns_keep_tables_out_of_the_analysis() {
    let config = Config {
        ignore_tables: vec!["shop.order".to_string()],
        ..Config::default()
    };

    let mut snapshot = mixed_snapshot();
    snapshot
        .tables
        .retain(|table| !config.is_table_ignored(&table.fqn()));

    let analysis = analyze(&snapshot);

    assert_eq!(analysis.summary.critical, 0);
    assert_eq!(analysis.worst(), Severity::Warning);
    assert!(analysis
        .reports
        .iter()
        .all(|r| r.entity.table_fqn() != "shop.order"));
}
