mod support;
use support::*;

use efaps::{driver::operation::Transaction, Config, Instance, MultiPrintQuery, QueryBuilder, Session, Value};
use pretty_assertions::assert_eq;

fn people() -> Vec<Instance> {
    (1..=3).map(|id| Instance::new(PERSON, id)).collect()
}

/// Walks the print query once, reading `exprs` for every instance.
fn rows(print: &mut MultiPrintQuery, exprs: &[&str]) -> Vec<Vec<Value>> {
    let mut rows = vec![];
    while print.next() {
        rows.push(
            exprs
                .iter()
                .map(|expr| print.select(expr).cloned().unwrap_or_default())
                .collect(),
        );
    }
    rows
}

#[test]
fn attributes_of_the_main_table() {
    let fixture = sqlite();
    let mut cx = fixture.db.context();

    let mut print = MultiPrintQuery::new(PERSON, people());
    print.add_attribute("Name").add_attribute("Status");
    assert!(print.execute(&mut cx).unwrap());

    let mut found = vec![];
    while print.next() {
        found.push((
            print.current_instance().unwrap().id,
            print.attribute("Name").cloned(),
            print.attribute("Status").cloned(),
        ));
    }

    assert_eq!(
        found,
        vec![
            (1, Some(Value::from("Alice")), Some(Value::I64(STATUS_ACTIVE))),
            (2, Some(Value::from("Bob")), Some(Value::I64(STATUS_INACTIVE))),
            (3, Some(Value::from("alina")), Some(Value::I64(STATUS_ACTIVE))),
        ]
    );
    assert_eq!(print.current_instance(), None);
}

#[test]
fn attributes_across_tables_are_merged_by_id() {
    let fixture = sqlite();
    let mut cx = fixture.db.context();

    let mut print = MultiPrintQuery::new(PERSON, people());
    print.add_attribute("Email").add_attribute("Name");
    print.execute(&mut cx).unwrap();

    assert_eq!(
        rows(&mut print, &["attribute[Name]", "attribute[Email]"]),
        vec![
            vec![Value::from("Alice"), Value::from("alice@example.com")],
            vec![Value::from("Bob"), Value::Null],
            vec![Value::from("alina"), Value::from("alina@example.com")],
        ]
    );
}

#[test]
fn converting_selects() {
    let fixture = sqlite();
    let mut cx = fixture.db.context();

    let mut print = MultiPrintQuery::new(PERSON, people());
    print
        .add_select("attribute[Born].format[%d.%m.%Y]")
        .unwrap()
        .add_select("attribute[Status].key")
        .unwrap()
        .add_select("type.label")
        .unwrap()
        .add_select("oid")
        .unwrap();
    print.execute(&mut cx).unwrap();

    assert_eq!(
        rows(
            &mut print,
            &[
                "attribute[Born].format[%d.%m.%Y]",
                "attribute[Status].key",
                "type.label",
                "oid",
            ]
        ),
        vec![
            vec![
                Value::from("01.04.1990"),
                Value::from("Active"),
                Value::from("Person"),
                Value::from("10.1"),
            ],
            vec![
                Value::Null,
                Value::from("Inactive"),
                Value::from("Person"),
                Value::from("10.2"),
            ],
            vec![
                Value::from("24.12.1985"),
                Value::from("Active"),
                Value::from("Person"),
                Value::from("10.3"),
            ],
        ]
    );
}

#[test]
fn type_selects_read_the_discriminator() {
    let fixture = sqlite();
    let mut cx = fixture.db.context_for(Session::new("en").company(7));

    let mut builder = QueryBuilder::by_name(fixture.db.schema(), "Invoice").unwrap();
    builder.add_where_attr_eq_value("Name", "INV-1").unwrap();

    let mut print = builder.print(&mut cx).unwrap();
    print
        .add_select("type.label")
        .unwrap()
        .add_select("type.name")
        .unwrap()
        .add_select("attribute[Contact].oid")
        .unwrap();
    print.execute(&mut cx).unwrap();

    assert_eq!(
        rows(
            &mut print,
            &["type.label", "type.name", "attribute[Contact].oid"]
        ),
        vec![vec![
            Value::from("Sales Invoice"),
            Value::from("Invoice"),
            Value::from("10.1"),
        ]]
    );
}

#[test]
fn link_from_yields_a_list_per_instance() {
    let fixture = sqlite();
    let mut cx = fixture.db.context_for(Session::new("en").company(7));

    let instances = vec![
        Instance::new(INVOICE, 1),
        Instance::new(RECEIPT, 2),
        Instance::new(INVOICE, 4),
    ];

    let mut print = MultiPrintQuery::new(INVOICE, instances);
    print
        .add_attribute("Name")
        .add_select("linkfrom[Position#Invoice].attribute[Quantity]")
        .unwrap();
    print.execute(&mut cx).unwrap();

    let found = rows(
        &mut print,
        &[
            "attribute[Name]",
            "linkfrom[Position#Invoice].attribute[Quantity]",
        ],
    );

    let quantities: Vec<Vec<i64>> = found
        .iter()
        .map(|row| {
            let mut values: Vec<i64> = row[1]
                .as_list()
                .unwrap()
                .iter()
                .filter_map(Value::as_i64)
                .collect();
            values.sort();
            values
        })
        .collect();

    assert_eq!(
        found.iter().map(|row| row[0].clone()).collect::<Vec<_>>(),
        vec![Value::from("INV-1"), Value::from("REC-1"), Value::from("INV-2")]
    );
    assert_eq!(quantities, vec![vec![2, 5], vec![], vec![9]]);
}

#[test]
fn batches_cover_every_instance() {
    let fixture = sqlite_with(Config::new().print_batch_size(2));
    let mut cx = fixture.db.context();

    let mut print = MultiPrintQuery::new(PERSON, people());
    print.add_attribute("Name").add_attribute("Email");
    print.execute(&mut cx).unwrap();

    assert_eq!(
        rows(&mut print, &["attribute[Name]"]),
        vec![
            vec![Value::from("Alice")],
            vec![Value::from("Bob")],
            vec![Value::from("alina")],
        ]
    );
}

#[test]
fn batches_split_the_id_list() {
    let (db, recorder) = recording_db_with(Config::new().print_batch_size(2));
    let mut cx = db.context();

    let mut print = MultiPrintQuery::new(PERSON, people());
    print.add_attribute("Name");
    print.execute(&mut cx).unwrap();

    assert_eq!(
        recorder.queries(),
        vec![
            r#"select "T0"."ID", "T0"."NAME" from "T_PERSON" "T0" where "T0"."ID" in (1, 2)"#,
            r#"select "T0"."ID", "T0"."NAME" from "T_PERSON" "T0" where "T0"."ID" in (3)"#,
        ]
    );
}

#[test]
fn duplicate_selects_are_read_once() {
    let (db, recorder) = recording_db();
    let mut cx = db.context();

    let mut print = MultiPrintQuery::new(PERSON, people());
    print
        .add_attribute("Name")
        .add_select("attribute[Name]")
        .unwrap();
    print.execute(&mut cx).unwrap();

    assert_eq!(
        recorder.queries(),
        vec![r#"select "T0"."ID", "T0"."NAME" from "T_PERSON" "T0" where "T0"."ID" in (1, 2, 3)"#]
    );
}

#[test]
fn no_instances_sends_nothing() {
    let (db, recorder) = recording_db();
    let mut cx = db.context();

    let mut print = MultiPrintQuery::new(PERSON, vec![]);
    print.add_attribute("Name");

    assert!(!print.execute(&mut cx).unwrap());
    assert!(!print.next());
    assert!(recorder.log().is_empty());
}

#[test]
fn invalid_selects_are_rejected() {
    let mut print = MultiPrintQuery::new(PERSON, people());

    assert!(print.add_select("attribute[Name").is_err());
    assert!(print.add_select("attribute[Name].label").is_err());
    assert!(print.add_select("frobnicate").is_err());
}

#[test]
fn leaf_must_fit_the_attribute() {
    let (db, _) = recording_db();
    let mut cx = db.context();

    let mut print = MultiPrintQuery::new(PERSON, people());
    print.add_select("attribute[Name].key").unwrap();

    let err = print.execute(&mut cx).unwrap_err();
    assert!(err.is_invalid_statement());
}

#[test]
fn unreadable_rows_abort_the_unit_of_work() {
    let (db, recorder) = recording_db();
    let mut cx = db.context();

    recorder.respond(2, vec![vec![Value::from("x"), Value::from("Alice")]]);

    let mut print = MultiPrintQuery::new(PERSON, people());
    print.add_attribute("Name").add_attribute("Email");

    let err = print.execute(&mut cx).unwrap_err();
    assert!(err.is_invalid_result(), "{err}");
    assert!(!cx.is_opened());
    assert_eq!(
        recorder.log().last(),
        Some(&transaction_log(Transaction::Rollback))
    );
}
