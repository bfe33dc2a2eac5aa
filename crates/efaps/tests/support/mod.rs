#![allow(dead_code)]

use efaps::{
    driver::{
        operation::Transaction, Capability, Connection, Driver, Operation, Response,
    },
    schema::{
        AttributeKind, BitEnum, BitEnumId, Classification, SqlTable, Status, TypeDef, TypeId,
    },
    Config, Db, Result, Schema,
};
use efaps_core::stmt::RowSet;
use efaps_sql::{Inline, Serializer};

use parking_lot::Mutex;
use std::{
    collections::VecDeque,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tempfile::TempDir;
use uuid::Uuid;

pub const PERSON: TypeId = TypeId(10);
pub const DOCUMENT: TypeId = TypeId(20);
pub const INVOICE: TypeId = TypeId(21);
pub const RECEIPT: TypeId = TypeId(22);
pub const OFFER: TypeId = TypeId(23);
pub const POSITION: TypeId = TypeId(30);
pub const CLASS_REL: TypeId = TypeId(40);
pub const SIZE_REL: TypeId = TypeId(41);
pub const CLASS_COLOR: TypeId = TypeId(50);
pub const CLASS_RED: TypeId = TypeId(51);
pub const CLASS_SIZE: TypeId = TypeId(52);

pub const WEEKDAYS: BitEnumId = BitEnumId(0);

pub const PERSON_UUID: &str = "5d7e1c3a-0000-4000-8000-000000000010";

pub const STATUS_ACTIVE: i64 = 100;
pub const STATUS_INACTIVE: i64 = 101;

pub fn schema() -> Schema {
    let mut builder = Schema::builder();

    builder
        .table(SqlTable::new(1, "T_PERSON"))
        .table(SqlTable::new(2, "T_PERSONEXT").main_table(1))
        .table(SqlTable::new(3, "T_DOC").sql_col_type("TYPEID"))
        .table(SqlTable::new(4, "T_POS"))
        .table(SqlTable::new(5, "T_CLASSREL"))
        .table(SqlTable::new(6, "T_CLASSDEF"))
        .table(SqlTable::new(7, "T_SIZEREL"));

    builder.bit_enum(BitEnum::new(WEEKDAYS, "Weekday", &["Mon", "Tue", "Wed"]));

    builder
        .status(Status::new(STATUS_ACTIVE, "Person_Status", "Active"))
        .status(Status::new(STATUS_INACTIVE, "Person_Status", "Inactive"));

    let status = AttributeKind::Status {
        group: "Person_Status".to_string(),
    };

    builder
        .ty(TypeDef::new(PERSON, "Person", 1)
            .uuid(Uuid::parse_str(PERSON_UUID).unwrap())
            .label("Person")
            .attribute("Name", "NAME", AttributeKind::String)
            .attribute_in("Email", 2, &["EMAIL"], AttributeKind::String)
            .attribute("Status", "STATUS", status)
            .attribute("Born", "BORN", AttributeKind::Date)
            .attribute("Created", "CREATED", AttributeKind::DateTime))
        .ty(TypeDef::new(DOCUMENT, "Document", 3)
            .company_dependent()
            .attribute("Company", "COMPANYID", AttributeKind::Company)
            .attribute("Name", "NAME", AttributeKind::String)
            .attribute("Contact", "CONTACTID", AttributeKind::Link { target: PERSON })
            .attribute("Days", "DAYS", AttributeKind::BitEnum(WEEKDAYS))
            .attribute("Date", "DOCDATE", AttributeKind::Date))
        .ty(TypeDef::new(INVOICE, "Invoice", 3)
            .label("Sales Invoice")
            .parent(DOCUMENT))
        .ty(TypeDef::new(RECEIPT, "Receipt", 3).parent(INVOICE))
        .ty(TypeDef::new(OFFER, "Offer", 3).parent(DOCUMENT))
        .ty(TypeDef::new(POSITION, "Position", 4)
            .attribute("Invoice", "DOCID", AttributeKind::Link { target: INVOICE })
            .attribute("Quantity", "QTY", AttributeKind::Integer))
        .ty(TypeDef::new(CLASS_REL, "ClassRel", 5)
            .attribute("Link", "LINKID", AttributeKind::Link { target: PERSON })
            .attribute("ClassType", "CLASSTYPEID", AttributeKind::Integer))
        .ty(TypeDef::new(SIZE_REL, "SizeRel", 7)
            .attribute("Person", "PERSONID", AttributeKind::Link { target: PERSON })
            .attribute("SizeType", "SIZETYPEID", AttributeKind::Integer))
        .ty(TypeDef::new(CLASS_COLOR, "Class_Color", 6).classification(Classification {
            relation_type: CLASS_REL,
            link_attribute: "Link".to_string(),
            type_attribute: "ClassType".to_string(),
        }))
        .ty(TypeDef::new(CLASS_RED, "Class_Red", 6).parent(CLASS_COLOR))
        .ty(TypeDef::new(CLASS_SIZE, "Class_Size", 6).classification(Classification {
            relation_type: SIZE_REL,
            link_attribute: "Person".to_string(),
            type_attribute: "SizeType".to_string(),
        }));

    builder.build().unwrap()
}

/// A driver that records every statement, rendered with inline literals, and
/// answers queries with queued row sets.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    shared: Arc<Recorded>,
}

#[derive(Debug, Default)]
struct Recorded {
    log: Mutex<Vec<String>>,
    responses: Mutex<VecDeque<Result<RowSet>>>,
    failing: Mutex<Vec<Transaction>>,
    connects: AtomicUsize,
}

#[derive(Debug)]
struct RecorderConnection {
    shared: Arc<Recorded>,
}

impl Recorder {
    pub fn new() -> Recorder {
        Recorder::default()
    }

    /// Queues rows answering the next query.
    pub fn respond(&self, width: usize, rows: Vec<Vec<efaps::Value>>) {
        let mut row_set = RowSet::new(width);
        for row in rows {
            row_set.push(row);
        }
        self.shared.responses.lock().push_back(Ok(row_set));
    }

    /// Makes the next query fail.
    pub fn fail(&self, err: efaps::Error) {
        self.shared.responses.lock().push_back(Err(err));
    }

    /// Makes every following `op` fail.
    pub fn fail_transaction(&self, op: Transaction) {
        self.shared.failing.lock().push(op);
    }

    /// Number of connections opened so far.
    pub fn connects(&self) -> usize {
        self.shared.connects.load(Ordering::SeqCst)
    }

    /// Everything sent so far, transaction control included.
    pub fn log(&self) -> Vec<String> {
        self.shared.log.lock().clone()
    }

    /// The queries sent so far.
    pub fn queries(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter(|sql| sql.starts_with("select"))
            .collect()
    }
}

impl Driver for Recorder {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    fn connect(&self) -> Result<Box<dyn Connection>> {
        self.shared.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecorderConnection {
            shared: self.shared.clone(),
        }))
    }
}

impl Connection for RecorderConnection {
    fn exec(&mut self, op: Operation) -> Result<Response> {
        let serializer = Serializer::sqlite();

        match op {
            Operation::QuerySql(query) => {
                let sql = serializer.serialize(&query.stmt, &mut Inline);
                self.shared.log.lock().push(sql);

                match self.shared.responses.lock().pop_front() {
                    Some(rows) => Ok(Response::row_set(rows?)),
                    None => Ok(Response::row_set(RowSet::new(query.ret.len()))),
                }
            }
            Operation::Transaction(op) => {
                self.shared
                    .log
                    .lock()
                    .push(serializer.serialize_transaction(&op));

                if self.shared.failing.lock().contains(&op) {
                    return Err(efaps::Error::driver_operation_failed(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        "disk I/O error",
                    )));
                }
                Ok(Response::count(0))
            }
            Operation::TableInformation(table) => Err(efaps::Error::invalid_schema(format!(
                "no catalog for `{table}`"
            ))),
        }
    }
}

pub fn recording_db() -> (Db, Recorder) {
    let recorder = Recorder::new();
    let db = Db::builder().build(schema(), recorder.clone()).unwrap();
    (db, recorder)
}

pub fn recording_db_with(config: Config) -> (Db, Recorder) {
    let recorder = Recorder::new();
    let db = Db::builder()
        .config(config)
        .build(schema(), recorder.clone())
        .unwrap();
    (db, recorder)
}

pub fn transaction_log(op: Transaction) -> String {
    Serializer::sqlite().serialize_transaction(&op)
}

/// An on-disk SQLite database holding the fixture tables and a few rows.
pub struct SqliteFixture {
    pub db: Db,
    _dir: TempDir,
}

pub fn sqlite() -> SqliteFixture {
    sqlite_with(Config::default())
}

pub fn sqlite_with(config: Config) -> SqliteFixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("efaps.db");
    create_tables(&path);

    let db = Db::builder()
        .config(config)
        .build(schema(), efaps_driver_sqlite::Sqlite::open(&path))
        .unwrap();

    SqliteFixture { db, _dir: dir }
}

fn create_tables(path: &Path) {
    let connection = rusqlite::Connection::open(path).unwrap();

    connection
        .execute_batch(
            r#"
            create table T_PERSON (
                ID integer primary key,
                NAME text,
                STATUS integer,
                BORN date,
                CREATED datetime
            );
            create table T_PERSONEXT (ID integer primary key, EMAIL text);
            create table T_DOC (
                ID integer primary key,
                TYPEID integer not null,
                COMPANYID integer not null,
                NAME text,
                CONTACTID integer,
                DAYS integer,
                DOCDATE date
            );
            create table T_POS (ID integer primary key, DOCID integer, QTY integer);
            create table T_CLASSREL (ID integer primary key, LINKID integer, CLASSTYPEID integer);
            create table T_CLASSDEF (ID integer primary key);
            create table T_SIZEREL (ID integer primary key, PERSONID integer, SIZETYPEID integer);

            insert into T_PERSON values (1, 'Alice', 100, '1990-04-01', '2024-01-15 08:30:00');
            insert into T_PERSON values (2, 'Bob', 101, null, '2024-02-01 12:00:00');
            insert into T_PERSON values (3, 'alina', 100, '1985-12-24', null);
            insert into T_PERSONEXT values (1, 'alice@example.com');
            insert into T_PERSONEXT values (3, 'alina@example.com');

            insert into T_DOC values (1, 21, 7, 'INV-1', 1, 3, '2024-03-01');
            insert into T_DOC values (2, 22, 7, 'REC-1', 2, 2, '2024-03-02');
            insert into T_DOC values (3, 23, 7, 'OFF-1', 1, 4, '2024-03-03');
            insert into T_DOC values (4, 21, 8, 'INV-2', 3, 1, '2024-03-04');

            insert into T_POS values (1, 1, 5);
            insert into T_POS values (2, 1, 2);
            insert into T_POS values (3, 4, 9);

            insert into T_CLASSREL values (1, 1, 51);
            insert into T_CLASSREL values (2, 2, 50);
            insert into T_SIZEREL values (1, 3, 52);
            "#,
        )
        .unwrap();
}
