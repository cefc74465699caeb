use cstar_executor::{ConnectionConfig, ForeignScan, Row, ScanState};
use cstar_plan::{
    ColumnDescriptor, ConsistencyLevel, RelationDescriptor, ServerOptions, TableOptions,
    UsedColumnSet, UserMappingOptions, plan_scan,
};
use cstar_result::{Error, ErrorKind};
use cstar_test_utils::{MemoryConnectionProvider, init_tracing_for_tests};
use cstar_types::{Datum, RelationalType, SessionTimeZone, WireValue};

/* --------------------------- Shared helpers ---------------------------- */

fn config() -> ConnectionConfig {
    ConnectionConfig::new(
        ServerOptions::new("10.0.0.7"),
        UserMappingOptions::with_credentials("reader", "secret"),
    )
}

fn users() -> RelationDescriptor {
    RelationDescriptor::new(
        "ks",
        "users",
        vec![
            ColumnDescriptor::new(1, "id", RelationalType::Integer).not_null(),
            ColumnDescriptor::new(2, "name", RelationalType::Text),
        ],
    )
    .unwrap()
    .with_options(TableOptions::default().with_read_consistency(ConsistencyLevel::Quorum))
}

fn whole_row() -> UsedColumnSet {
    UsedColumnSet::whole_row()
}

fn user_row(id: i32, name: &str) -> Row {
    Row::new(vec![
        Some(WireValue::Int(id)),
        Some(WireValue::Text(name.to_string())),
    ])
}

/* ------------------------------- Tests --------------------------------- */

#[test]
fn scan_fetches_once_and_reports_eof() {
    init_tracing_for_tests();
    let provider = MemoryConnectionProvider::new();
    provider.push_rows(vec![user_row(1, "ada"), user_row(2, "bob")]);
    let rel = users();

    let mut scan = ForeignScan::begin(
        &provider,
        &config(),
        &rel,
        plan_scan(&rel, &whole_row()),
        SessionTimeZone::UTC,
    )
    .unwrap();
    assert_eq!(scan.state(), ScanState::NotStarted);
    assert_eq!(provider.execute_count(), 0);
    assert_eq!(provider.preparing_flags(), vec![false]);

    let first = scan.next().unwrap().unwrap();
    assert_eq!(
        first,
        vec![Some(Datum::Int4(1)), Some(Datum::Text("ada".into()))]
    );
    assert!(scan.is_eof());
    assert_eq!(scan.state(), ScanState::HasBatch);
    assert!(scan.next().unwrap().is_some());
    assert!(scan.next().unwrap().is_none());
    assert_eq!(scan.state(), ScanState::Eof);
    assert!(scan.next().unwrap().is_none());

    let executed = provider.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].sql, "SELECT id, name FROM ks.users");
    assert!(executed[0].params.is_empty());
    assert_eq!(executed[0].consistency, ConsistencyLevel::Quorum);

    scan.end();
    assert_eq!(provider.released(), 1);
}

#[test]
fn rescan_after_fetch_replays_without_round_trip() {
    let provider = MemoryConnectionProvider::new();
    provider.push_rows(vec![user_row(1, "ada"), user_row(2, "bob")]);
    let rel = users();
    let mut scan = ForeignScan::begin(
        &provider,
        &config(),
        &rel,
        plan_scan(&rel, &whole_row()),
        SessionTimeZone::UTC,
    )
    .unwrap();

    while scan.next().unwrap().is_some() {}
    assert_eq!(scan.batch().cursor(), 2);

    scan.rescan().unwrap();
    assert_eq!(scan.batch().cursor(), 0);
    assert_eq!(scan.batch().len(), 2);
    let again = scan.next().unwrap().unwrap();
    assert_eq!(again[0], Some(Datum::Int4(1)));
    assert_eq!(provider.execute_count(), 1);
}

#[test]
fn rescan_before_fetch_leaves_a_clean_state() {
    let provider = MemoryConnectionProvider::new();
    provider.push_rows(vec![user_row(5, "eve")]);
    let rel = users();
    let mut scan = ForeignScan::begin(
        &provider,
        &config(),
        &rel,
        plan_scan(&rel, &whole_row()),
        SessionTimeZone::UTC,
    )
    .unwrap();

    scan.rescan().unwrap();
    assert!(!scan.is_eof());
    assert!(scan.batch().is_empty());
    assert_eq!(provider.execute_count(), 0);

    assert!(scan.next().unwrap().is_some());
    assert_eq!(provider.execute_count(), 1);
}

#[test]
fn remote_failure_releases_session_and_sets_eof() {
    let provider = MemoryConnectionProvider::new();
    provider.push_failure("Operation timed out - received only 0 responses.");
    let rel = users();
    let mut scan = ForeignScan::begin(
        &provider,
        &config(),
        &rel,
        plan_scan(&rel, &whole_row()),
        SessionTimeZone::UTC,
    )
    .unwrap();

    let err = scan.next().unwrap_err();
    match &err {
        Error::RemoteExecution { operation, message } => {
            assert_eq!(*operation, "SELECT");
            assert_eq!(message, "Operation timed out - received only 0 responses.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::RemoteExecution);
    assert!(scan.is_eof());
    assert_eq!(provider.released(), 1);

    scan.end();
    drop(scan);
    assert_eq!(provider.released(), 1);
    assert_eq!(provider.outstanding(), 0);
}

#[test]
fn result_shape_mismatch_aborts_the_batch() {
    let provider = MemoryConnectionProvider::new();
    provider.push_rows(vec![Row::new(vec![
        Some(WireValue::Int(1)),
        Some(WireValue::Text("x".into())),
        Some(WireValue::Int(9)),
    ])]);
    let rel = users();
    let mut scan = ForeignScan::begin(
        &provider,
        &config(),
        &rel,
        plan_scan(&rel, &whole_row()),
        SessionTimeZone::UTC,
    )
    .unwrap();

    let err = scan.next().unwrap_err();
    assert!(matches!(
        err,
        Error::ResultShape {
            expected: 2,
            actual: 3
        }
    ));
    assert!(scan.batch().is_empty());
    assert!(scan.next().unwrap().is_none());
}

#[test]
fn empty_column_set_selects_null_placeholder() {
    let provider = MemoryConnectionProvider::new();
    provider.push_rows(vec![Row::new(vec![None]), Row::new(vec![None])]);
    let rel = users();
    let plan = plan_scan(&rel, &UsedColumnSet::new());
    assert_eq!(plan.sql, "SELECT NULL FROM ks.users");
    assert!(plan.retrieved_attrs.is_empty());
    assert_eq!(plan.retrieved_attrs.expected_remote_columns(), 1);

    let mut scan =
        ForeignScan::begin(&provider, &config(), &rel, plan, SessionTimeZone::UTC).unwrap();
    let mut count = 0;
    while let Some(tuple) = scan.next().unwrap() {
        assert_eq!(tuple, vec![None, None]);
        count += 1;
    }
    assert_eq!(count, 2);
}

#[test]
fn large_result_decodes_in_one_batch() {
    const ROWS: i32 = 100_000;
    let provider = MemoryConnectionProvider::new();
    provider.push_rows((0..ROWS).map(|i| user_row(i, "n")).collect());
    let rel = users();
    let mut scan = ForeignScan::begin(
        &provider,
        &config(),
        &rel,
        plan_scan(&rel, &whole_row()),
        SessionTimeZone::UTC,
    )
    .unwrap();

    let mut last = None;
    let mut count = 0;
    while let Some(tuple) = scan.next().unwrap() {
        last = tuple[0].clone();
        count += 1;
    }
    assert_eq!(count, ROWS);
    assert_eq!(last, Some(Datum::Int4(ROWS - 1)));
    assert_eq!(scan.batch().len(), ROWS as usize);
    assert_eq!(provider.execute_count(), 1);
}

#[test]
fn closed_scan_is_idempotent_and_unusable() {
    let provider = MemoryConnectionProvider::new();
    let rel = users();
    let mut scan = ForeignScan::begin(
        &provider,
        &config(),
        &rel,
        plan_scan(&rel, &whole_row()),
        SessionTimeZone::UTC,
    )
    .unwrap();

    scan.end();
    scan.end();
    assert_eq!(scan.state(), ScanState::Closed);
    assert_eq!(provider.released(), 1);
    assert!(matches!(scan.next(), Err(Error::Internal(_))));
    assert!(matches!(scan.rescan(), Err(Error::Internal(_))));
    assert_eq!(provider.execute_count(), 0);
}

#[test]
fn dropping_an_open_scan_returns_the_session() {
    let provider = MemoryConnectionProvider::new();
    provider.push_rows(vec![user_row(1, "ada")]);
    let rel = users();
    {
        let mut scan = ForeignScan::begin(
            &provider,
            &config(),
            &rel,
            plan_scan(&rel, &whole_row()),
            SessionTimeZone::UTC,
        )
        .unwrap();
        assert!(scan.next().unwrap().is_some());
        assert_eq!(provider.outstanding(), 1);
    }
    assert_eq!(provider.released(), 1);
}

#[test]
fn acquire_failure_surfaces_before_any_state() {
    let provider = MemoryConnectionProvider::new();
    provider.fail_acquire("connection refused");
    let rel = users();
    let err = ForeignScan::begin(
        &provider,
        &config(),
        &rel,
        plan_scan(&rel, &whole_row()),
        SessionTimeZone::UTC,
    )
    .unwrap_err();
    assert!(err.to_string().contains("connection refused"));
    assert_eq!(provider.released(), 0);
}
