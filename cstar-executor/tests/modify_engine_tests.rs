use cstar_executor::{ConnectionConfig, ForeignModify, ModifyRow, Tuple};
use cstar_plan::{
    ColumnDescriptor, ConsistencyLevel, ModifyOperation, ModifyPlan, RelationDescriptor,
    ServerOptions, TableOptions, TargetAttrs, UserMappingOptions, plan_modify,
};
use cstar_result::{Error, ErrorKind};
use cstar_test_utils::{MemoryConnectionProvider, init_tracing_for_tests};
use cstar_types::{Datum, RelationalType, SessionTimeZone, WireValue};

/* --------------------------- Shared helpers ---------------------------- */

fn config() -> ConnectionConfig {
    ConnectionConfig::new(ServerOptions::new("127.0.0.1"), UserMappingOptions::default())
}

/// `(id int, v1 smallint, v2 bigint, v3 boolean)` keyed by `id`.
fn table() -> RelationDescriptor {
    RelationDescriptor::new(
        "ks",
        "t",
        vec![
            ColumnDescriptor::new(1, "id", RelationalType::Integer),
            ColumnDescriptor::new(2, "v1", RelationalType::SmallInt),
            ColumnDescriptor::new(3, "v2", RelationalType::BigInt),
            ColumnDescriptor::new(4, "v3", RelationalType::Boolean),
        ],
    )
    .unwrap()
    .with_options(
        TableOptions::default()
            .with_primary_key("id")
            .with_write_consistency(ConsistencyLevel::LocalQuorum),
    )
}

fn row(id: Option<i32>, v1: Option<i16>, v2: Option<i64>, v3: Option<bool>) -> Tuple {
    vec![
        id.map(Datum::Int4),
        v1.map(Datum::Int2),
        v2.map(Datum::Int8),
        v3.map(Datum::Bool),
    ]
}

fn begin<'a>(
    provider: &'a MemoryConnectionProvider,
    rel: &'a RelationDescriptor,
    plan: ModifyPlan,
) -> ForeignModify<'a, MemoryConnectionProvider> {
    ForeignModify::begin(provider, &config(), rel, plan, SessionTimeZone::UTC).unwrap()
}

/* ------------------------------- Tests --------------------------------- */

#[test]
fn insert_binds_targets_in_list_order() {
    init_tracing_for_tests();
    let provider = MemoryConnectionProvider::new();
    let rel = table();
    let plan = ModifyPlan::insert(&rel, TargetAttrs::new(vec![1, 3, 4]), None).unwrap();
    assert_eq!(plan.sql, "INSERT INTO ks.t (id, v2, v3) VALUES (?, ?, ?)");

    let mut modify = begin(&provider, &rel, plan);
    modify
        .insert(&row(Some(1), None, Some(2), Some(true)))
        .unwrap();
    modify.end();

    let executed = provider.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(
        executed[0].params,
        vec![
            Some(WireValue::Int(1)),
            Some(WireValue::BigInt(2)),
            Some(WireValue::Boolean(true)),
        ]
    );
    assert_eq!(executed[0].consistency, ConsistencyLevel::LocalQuorum);
    assert_eq!(provider.preparing_flags(), vec![true]);
    assert_eq!(provider.released(), 1);
}

#[test]
fn update_binds_key_last() {
    let provider = MemoryConnectionProvider::new();
    let rel = table();
    let plan = plan_modify(&rel, ModifyOperation::Update, &[4], None).unwrap();
    assert_eq!(plan.sql, "UPDATE ks.t SET v3 = ? WHERE id = ?");

    let mut modify = begin(&provider, &rel, plan);
    modify
        .update(&ModifyRow::new(
            Some(Datum::Int4(1)),
            row(Some(1), None, None, Some(true)),
        ))
        .unwrap();

    assert_eq!(
        provider.executed()[0].params,
        vec![Some(WireValue::Boolean(true)), Some(WireValue::Int(1))]
    );
}

#[test]
fn delete_binds_only_the_key() {
    let provider = MemoryConnectionProvider::new();
    let rel = table();
    let plan = plan_modify(&rel, ModifyOperation::Delete, &[], None).unwrap();
    assert_eq!(plan.sql, "DELETE FROM ks.t WHERE id = ?");

    let mut modify = begin(&provider, &rel, plan);
    modify
        .delete(&ModifyRow::key_only(Some(Datum::Int4(1))))
        .unwrap();
    assert_eq!(provider.executed()[0].params, vec![Some(WireValue::Int(1))]);
}

#[test]
fn statement_is_reused_across_rows() {
    let provider = MemoryConnectionProvider::new();
    let rel = table();
    let plan = plan_modify(&rel, ModifyOperation::Delete, &[], None).unwrap();
    let mut modify = begin(&provider, &rel, plan);
    for id in 1..=3 {
        modify
            .delete(&ModifyRow::key_only(Some(Datum::Int4(id))))
            .unwrap();
    }
    assert_eq!(modify.executed(), 3);
    let executed = provider.executed();
    assert!(executed.iter().all(|s| s.sql == executed[0].sql));
    assert_eq!(executed[2].params, vec![Some(WireValue::Int(3))]);
    assert_eq!(provider.acquired(), 1);
}

#[test]
fn null_key_is_refused_without_a_remote_call() {
    let provider = MemoryConnectionProvider::new();
    let rel = table();
    let plan = plan_modify(&rel, ModifyOperation::Update, &[3], None).unwrap();
    let mut modify = begin(&provider, &rel, plan);

    let err = modify
        .update(&ModifyRow::new(None, row(None, None, Some(5), None)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataIntegrity);
    assert!(err.to_string().contains("primary key column \"id\" contains a NULL value"));
    assert_eq!(provider.execute_count(), 0);
}

#[test]
fn null_smallint_is_refused_without_a_remote_call() {
    let provider = MemoryConnectionProvider::new();
    let rel = table();
    let plan = plan_modify(&rel, ModifyOperation::Insert, &[], None).unwrap();
    assert_eq!(&*plan.target_attrs, &[1, 2, 3, 4]);
    let mut modify = begin(&provider, &rel, plan);

    let err = modify
        .insert(&row(Some(1), None, Some(2), Some(false)))
        .unwrap_err();
    assert!(matches!(err, Error::DataIntegrity(_)));
    assert_eq!(provider.execute_count(), 0);

    // The failed row leaves the operation usable.
    modify
        .insert(&row(Some(1), Some(7), Some(2), Some(false)))
        .unwrap();
    assert_eq!(provider.execute_count(), 1);
    assert_eq!(provider.executed()[0].params[1], Some(WireValue::SmallInt(7)));
}

#[test]
fn remote_insert_failure_releases_the_session_once() {
    let provider = MemoryConnectionProvider::new();
    provider.push_failure("Cannot achieve consistency level LOCAL_QUORUM");
    let rel = table();
    let plan = ModifyPlan::insert(&rel, TargetAttrs::new(vec![1, 3, 4]), None).unwrap();
    let mut modify = begin(&provider, &rel, plan);

    let err = modify
        .insert(&row(Some(1), None, Some(2), Some(true)))
        .unwrap_err();
    match &err {
        Error::RemoteExecution { operation, message } => {
            assert_eq!(*operation, "INSERT");
            assert_eq!(message, "Cannot achieve consistency level LOCAL_QUORUM");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(provider.released(), 1);
    assert!(modify.is_closed());

    modify.end();
    drop(modify);
    assert_eq!(provider.released(), 1);
    assert_eq!(provider.outstanding(), 0);
}

#[test]
fn writes_after_end_are_rejected() {
    let provider = MemoryConnectionProvider::new();
    let rel = table();
    let plan = plan_modify(&rel, ModifyOperation::Delete, &[], None).unwrap();
    let mut modify = begin(&provider, &rel, plan);
    modify.end();
    let err = modify
        .delete(&ModifyRow::key_only(Some(Datum::Int4(1))))
        .unwrap_err();
    assert!(matches!(err, Error::Internal(_)));
    assert_eq!(provider.execute_count(), 0);
}

#[test]
fn operation_must_match_the_plan() {
    let provider = MemoryConnectionProvider::new();
    let rel = table();
    let plan = plan_modify(&rel, ModifyOperation::Delete, &[], None).unwrap();
    let mut modify = begin(&provider, &rel, plan);
    assert!(matches!(
        modify.insert(&row(Some(1), Some(1), Some(1), Some(true))),
        Err(Error::Internal(_))
    ));
}

#[test]
fn mismatched_datum_is_a_translation_error() {
    let provider = MemoryConnectionProvider::new();
    let rel = table();
    let plan = ModifyPlan::insert(&rel, TargetAttrs::new(vec![3]), None).unwrap();
    let mut modify = begin(&provider, &rel, plan);
    let err = modify
        .insert(&vec![None, None, Some(Datum::Text("2".into())), None])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Translation);
    assert_eq!(provider.execute_count(), 0);
}
