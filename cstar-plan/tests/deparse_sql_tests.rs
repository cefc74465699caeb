use cstar_plan::{
    ColumnDescriptor, ModifyOperation, OnConflict, RelationDescriptor, TableOptions,
    UsedColumnSet, plan_modify, plan_scan,
};
use cstar_types::RelationalType;
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/* --------------------------- Shared helpers ---------------------------- */

fn parse_one(sql: &str) -> Statement {
    let mut statements = Parser::parse_sql(&GenericDialect {}, sql)
        .unwrap_or_else(|err| panic!("deparsed text does not parse: {sql}: {err}"));
    assert_eq!(statements.len(), 1, "{sql}");
    statements.remove(0)
}

/// Six columns, two of them dropped, one with a remote name override.
fn wide_relation() -> RelationDescriptor {
    RelationDescriptor::new(
        "local",
        "readings",
        vec![
            ColumnDescriptor::new(1, "sensor", RelationalType::Uuid),
            ColumnDescriptor::new(2, "taken_at", RelationalType::TimestampTz(Some(0))),
            ColumnDescriptor::new(3, "legacy", RelationalType::Text).dropped(),
            ColumnDescriptor::new(4, "value", RelationalType::DoublePrecision)
                .with_remote_name("Value"),
            ColumnDescriptor::new(5, "unit", RelationalType::Varchar(Some(8))),
            ColumnDescriptor::new(6, "old_flag", RelationalType::Boolean).dropped(),
        ],
    )
    .unwrap()
    .with_options(
        TableOptions::default()
            .with_schema_name("Telemetry")
            .with_table_name("readings")
            .with_primary_key("sensor"),
    )
}

/* ------------------------------- Tests --------------------------------- */

#[test]
fn every_column_subset_yields_ascending_live_ordinals() {
    let rel = wide_relation();
    for mask in 0u32..(1 << 6) {
        let used: UsedColumnSet = (1..=6).filter(|o| mask & (1 << (o - 1)) != 0).collect();
        let plan = plan_scan(&rel, &used);

        let attrs = &*plan.retrieved_attrs;
        assert!(attrs.windows(2).all(|w| w[0] < w[1]), "{attrs:?}");
        assert!(attrs.iter().all(|o| *o != 3 && *o != 6), "{attrs:?}");
        let expected: Vec<usize> = [1, 2, 4, 5]
            .into_iter()
            .filter(|o| used.contains(*o))
            .collect();
        assert_eq!(attrs, expected.as_slice());

        if attrs.is_empty() {
            assert_eq!(plan.sql, "SELECT NULL FROM \"Telemetry\".readings");
        }
        assert!(matches!(parse_one(&plan.sql), Statement::Query(_)));
    }
}

#[test]
fn modify_statements_parse() {
    let rel = wide_relation();
    let insert = plan_modify(&rel, ModifyOperation::Insert, &[], Some(OnConflict::DoNothing))
        .unwrap();
    assert_eq!(
        insert.sql,
        "INSERT INTO \"Telemetry\".readings (sensor, taken_at, \"Value\", unit) \
         VALUES (?, ?, ?, ?) ON CONFLICT DO NOTHING"
    );
    assert!(parse_one(&insert.sql).to_string().starts_with("INSERT INTO"));

    let update = plan_modify(&rel, ModifyOperation::Update, &[5, 4], None).unwrap();
    assert_eq!(
        update.sql,
        "UPDATE \"Telemetry\".readings SET unit = ?, \"Value\" = ? WHERE sensor = ?"
    );
    assert!(parse_one(&update.sql).to_string().starts_with("UPDATE"));

    let delete = plan_modify(&rel, ModifyOperation::Delete, &[], None).unwrap();
    assert_eq!(delete.sql, "DELETE FROM \"Telemetry\".readings WHERE sensor = ?");
    assert!(parse_one(&delete.sql).to_string().starts_with("DELETE FROM"));
}

#[test]
fn placeholder_count_matches_binding_layout() {
    let rel = wide_relation();
    for (operation, assigned) in [
        (ModifyOperation::Insert, vec![]),
        (ModifyOperation::Update, vec![2]),
        (ModifyOperation::Update, vec![1, 2, 4, 5]),
        (ModifyOperation::Delete, vec![]),
    ] {
        let plan = plan_modify(&rel, operation, &assigned, None).unwrap();
        let bound = plan.target_attrs.len() + usize::from(plan.key.is_some());
        assert_eq!(plan.sql.matches('?').count(), bound, "{}", plan.sql);
    }
}

#[test]
fn dropped_columns_cannot_be_assigned() {
    let rel = wide_relation();
    assert!(plan_modify(&rel, ModifyOperation::Update, &[3], None).is_err());
}
