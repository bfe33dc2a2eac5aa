use efaps_core::{
    driver::{
        operation::{Operation, QuerySql, Transaction},
        Driver,
    },
    schema::ColumnType,
    stmt::{SqlPart, SqlSelect, Value},
    Connection,
};
use efaps_driver_sqlite::Sqlite;

use chrono::NaiveDate;
use std::time::{Duration, Instant};

fn fixture() -> (tempfile::TempDir, Sqlite) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("efaps.db");

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(
        "create table T_DOC (
            ID integer primary key,
            NAME varchar(64) not null,
            CREATED datetime,
            DUE date,
            AMOUNT decimal(10,2),
            ACTIVE boolean
        );
        insert into T_DOC values (1, 'Invoice', '2024-03-01 12:30:00', '2024-04-01', 10.5, 1);
        insert into T_DOC values (2, 'Receipt', '2024-03-02T08:00:00.250', '2024-04-02', 3, 0);
        create table T_ODD (ID integer, SHAPE geometry);",
    )
    .unwrap();

    (dir, Sqlite::open(&path))
}

fn select_docs() -> SqlSelect {
    SqlSelect::new()
        .column(0, "ID")
        .column(0, "NAME")
        .column(0, "CREATED")
        .column(0, "DUE")
        .column(0, "AMOUNT")
        .column(0, "ACTIVE")
        .from("T_DOC", 0)
}

const DOC_COLUMNS: [ColumnType; 6] = [
    ColumnType::Integer,
    ColumnType::String,
    ColumnType::DateTime,
    ColumnType::Date,
    ColumnType::Real,
    ColumnType::Boolean,
];

fn query(conn: &mut dyn Connection, select: SqlSelect) -> efaps_core::Result<Vec<Vec<Value>>> {
    let op = QuerySql::new(select, DOC_COLUMNS[..].to_vec());
    Ok(conn.exec(Operation::QuerySql(op))?.rows.into_values()?.rows)
}

#[test]
fn reads_typed_rows() {
    let (_dir, driver) = fixture();
    let mut conn = driver.connect().unwrap();

    let rows = query(&mut *conn, select_docs()).unwrap();
    assert_eq!(rows.len(), 2);

    let created = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap();
    assert_eq!(
        rows[0],
        vec![
            Value::I64(1),
            Value::from("Invoice"),
            Value::DateTime(created),
            Value::Date(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()),
            Value::F64(10.5),
            Value::Bool(true),
        ]
    );

    let second = NaiveDate::from_ymd_opt(2024, 3, 2)
        .unwrap()
        .and_hms_milli_opt(8, 0, 0, 250)
        .unwrap();
    assert_eq!(rows[1][2], Value::DateTime(second));
    assert_eq!(rows[1][4], Value::F64(3.0));
}

#[test]
fn binds_parameters() {
    let (_dir, driver) = fixture();
    let mut conn = driver.connect().unwrap();

    let mut select = select_docs();
    select
        .push_column(0, "NAME")
        .push(SqlPart::Equal)
        .push_value("Receipt");

    let rows = query(&mut *conn, select).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], Value::I64(2));

    let created = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap();
    let mut select = select_docs();
    select
        .push_column(0, "CREATED")
        .push(SqlPart::Equal)
        .push_value(created);

    let rows = query(&mut *conn, select).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], Value::I64(1));
}

#[test]
fn failed_statement_carries_sql() {
    let (_dir, driver) = fixture();
    let mut conn = driver.connect().unwrap();

    let select = SqlSelect::new().column(0, "ID").from("T_MISSING", 0);
    let err = conn
        .exec(Operation::QuerySql(QuerySql::new(
            select,
            vec![ColumnType::Integer],
        )))
        .unwrap_err();

    assert!(err.is_statement_failed());
    assert_eq!(
        err.sql(),
        Some(r#"select "T0"."ID" from "T_MISSING" "T0""#)
    );
    assert!(err.to_string().contains("no such table"));
}

#[test]
fn expired_deadline_times_out() {
    let (_dir, driver) = fixture();
    let mut conn = driver.connect().unwrap();

    let op = QuerySql::new(select_docs(), DOC_COLUMNS[..].to_vec())
        .deadline(Some(Instant::now() - Duration::from_millis(1)));

    let err = conn.exec(Operation::QuerySql(op)).unwrap_err();
    assert!(err.is_statement_timed_out());
    assert!(err.sql().unwrap().starts_with("select"));
}

#[test]
fn transactions_roll_back() {
    let (dir, driver) = fixture();
    let mut conn = driver.connect().unwrap();

    conn.exec(Transaction::Start.into()).unwrap();
    conn.exec(Transaction::Rollback.into()).unwrap();
    conn.exec(Transaction::Start.into()).unwrap();
    conn.exec(Transaction::Commit.into()).unwrap();

    // Committing twice fails, there is no open transaction
    let err = conn.exec(Transaction::Commit.into()).unwrap_err();
    assert!(err.is_driver_operation_failed());
    drop(dir);
}

#[test]
fn table_information() {
    let (_dir, driver) = fixture();
    let mut conn = driver.connect().unwrap();

    let info = conn
        .exec(Operation::TableInformation("T_DOC".to_string()))
        .unwrap()
        .rows
        .into_information()
        .unwrap();

    assert_eq!(info.columns.len(), 6);
    let name = info.column("name").unwrap();
    assert_eq!(name.ty, ColumnType::String);
    assert!(!name.nullable);
    assert_eq!(info.column("CREATED").unwrap().ty, ColumnType::DateTime);
    assert_eq!(info.column("DUE").unwrap().ty, ColumnType::Date);
    assert_eq!(info.column("ACTIVE").unwrap().ty, ColumnType::Boolean);
    assert!(info.column("AMOUNT").unwrap().nullable);
}

#[test]
fn unknown_column_type() {
    let (_dir, driver) = fixture();
    let mut conn = driver.connect().unwrap();

    let err = conn
        .exec(Operation::TableInformation("T_ODD".to_string()))
        .unwrap_err();
    assert!(err.is_unknown_column_type());
    assert_eq!(
        err.to_string(),
        "unknown column type `geometry` for T_ODD.SHAPE"
    );

    let err = conn
        .exec(Operation::TableInformation("T_NONE".to_string()))
        .unwrap_err();
    assert!(err.is_invalid_schema());
}

#[test]
fn connection_urls() {
    assert!(matches!(
        Sqlite::new("sqlite::memory:").unwrap(),
        Sqlite::InMemory
    ));
    assert!(matches!(
        Sqlite::new("sqlite:///tmp/efaps.db").unwrap(),
        Sqlite::File(_)
    ));
    assert!(Sqlite::new("postgresql://localhost/efaps")
        .unwrap_err()
        .is_invalid_connection_url());
    assert_eq!(Sqlite::in_memory().max_connections(), Some(1));
    assert_eq!(Sqlite::open("x.db").max_connections(), None);
}
