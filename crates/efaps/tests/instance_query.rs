mod support;
use support::*;

use efaps::{
    driver::operation::Transaction,
    search::{QPart, QValue},
    AccessCheck, AttributeQuery, Config, Db, Error, Instance, InstanceQuery, QueryBuilder,
    Result, Schema, Session, Value,
};
use pretty_assertions::assert_eq;

fn sorted(mut instances: Vec<Instance>) -> Vec<Instance> {
    instances.sort_by_key(|instance| instance.id);
    instances
}

#[test]
fn find_by_name() {
    let fixture = sqlite();
    let mut cx = fixture.db.context();

    let mut builder = QueryBuilder::by_name(fixture.db.schema(), "Person").unwrap();
    builder.add_where_attr_eq_value("Name", "Alice").unwrap();

    let instances = builder.get_query().execute(&mut cx).unwrap();
    assert_eq!(instances, vec![Instance::new(PERSON, 1)]);
    assert_eq!(instances[0].oid(), "10.1");
}

#[test]
fn find_through_joined_table() {
    let fixture = sqlite();
    let mut cx = fixture.db.context();

    let mut builder = QueryBuilder::by_name(fixture.db.schema(), "Person").unwrap();
    builder
        .add_where_attr_match_value("Email", "*@example.com")
        .unwrap();

    let instances = sorted(builder.get_query().execute(&mut cx).unwrap());
    assert_eq!(
        instances,
        vec![Instance::new(PERSON, 1), Instance::new(PERSON, 3)]
    );
}

#[test]
fn case_insensitive_match() {
    let fixture = sqlite();
    let mut cx = fixture.db.context();

    let mut builder = QueryBuilder::by_name(fixture.db.schema(), "Person").unwrap();
    builder
        .add_where_attr_match_value("Name", "al*")
        .unwrap()
        .ignore_case(true);

    let instances = sorted(builder.get_query().execute(&mut cx).unwrap());
    assert_eq!(
        instances,
        vec![Instance::new(PERSON, 1), Instance::new(PERSON, 3)]
    );
}

#[test]
fn status_and_date_range() {
    let fixture = sqlite();
    let mut cx = fixture.db.context();

    let mut builder = QueryBuilder::by_name(fixture.db.schema(), "Person").unwrap();
    builder.add_where_attr_eq_value("Status", "Active").unwrap();
    builder
        .add_where_attr_greater_value("Born", chrono::NaiveDate::from_ymd_opt(1988, 1, 1).unwrap())
        .unwrap();

    let instances = builder.get_query().execute(&mut cx).unwrap();
    assert_eq!(instances, vec![Instance::new(PERSON, 1)]);
}

#[test]
fn null_comparison() {
    let fixture = sqlite();
    let mut cx = fixture.db.context();

    let mut builder = QueryBuilder::by_name(fixture.db.schema(), "Person").unwrap();
    builder.add_where_attr_is_null("Born");

    let instances = builder.get_query().execute(&mut cx).unwrap();
    assert_eq!(instances, vec![Instance::new(PERSON, 2)]);
}

#[test]
fn instances_carry_their_concrete_type() {
    let fixture = sqlite();
    let mut cx = fixture.db.context_for(Session::new("en").company(7));

    let mut query = InstanceQuery::new(DOCUMENT);
    let instances = sorted(query.execute(&mut cx).unwrap());

    assert_eq!(
        instances,
        vec![
            Instance::new(INVOICE, 1),
            Instance::new(RECEIPT, 2),
            Instance::new(OFFER, 3),
        ]
    );
}

#[test]
fn child_types_can_be_excluded() {
    let fixture = sqlite();
    let mut cx = fixture.db.context_for(Session::new("en").company(7));

    let mut query = InstanceQuery::new(INVOICE);
    assert_eq!(
        sorted(query.execute(&mut cx).unwrap()),
        vec![Instance::new(INVOICE, 1), Instance::new(RECEIPT, 2)]
    );

    let mut query = InstanceQuery::new(INVOICE);
    query.include_child_types(false);
    assert_eq!(
        query.execute(&mut cx).unwrap(),
        vec![Instance::new(INVOICE, 1)]
    );
}

#[test]
fn child_types_default_follows_config() {
    let (db, recorder) = recording_db_with(Config::new().include_child_types(false));
    let mut cx = db.context_for(Session::new("en").company(7));

    InstanceQuery::new(DOCUMENT).execute(&mut cx).unwrap();

    assert_eq!(
        recorder.queries(),
        vec![
            r#"select "T0"."ID", "T0"."TYPEID" from "T_DOC" "T0" where "T0"."TYPEID"=20 and "T0"."COMPANYID"=7"#
        ]
    );
}

#[test]
fn company_is_bound_from_session() {
    let fixture = sqlite();
    let mut cx = fixture.db.context_for(Session::new("en").company(8));

    let instances = InstanceQuery::new(DOCUMENT).execute(&mut cx).unwrap();
    assert_eq!(instances, vec![Instance::new(INVOICE, 4)]);
}

#[test]
fn missing_company_fails_before_any_statement() {
    let (db, recorder) = recording_db();
    let mut cx = db.context();

    let err = InstanceQuery::new(DOCUMENT).execute(&mut cx).unwrap_err();

    assert!(err.is_missing_company());
    assert!(recorder.log().is_empty());
    assert!(!cx.is_opened());
}

#[test]
fn company_can_be_set_on_context() {
    let (db, recorder) = recording_db();
    let mut cx = db.context();
    cx.set_company(Some(7));

    InstanceQuery::new(OFFER).execute(&mut cx).unwrap();

    assert_eq!(
        recorder.queries(),
        vec![
            r#"select "T0"."ID", "T0"."TYPEID" from "T_DOC" "T0" where "T0"."TYPEID"=23 and "T0"."COMPANYID"=7"#
        ]
    );
}

#[test]
fn executing_twice_sends_the_same_statement() {
    let (db, recorder) = recording_db();
    let mut cx = db.context_for(Session::new("en").company(7));

    let mut builder = QueryBuilder::by_name(db.schema(), "Invoice").unwrap();
    builder.add_where_attr_eq_value("Name", "INV-1").unwrap();

    let query = builder.get_query();
    query.execute(&mut cx).unwrap();
    query.execute(&mut cx).unwrap();

    let queries = recorder.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0], queries[1]);
}

#[test]
fn statements_share_one_transaction() {
    let (db, recorder) = recording_db();
    let mut cx = db.context();

    InstanceQuery::new(PERSON).execute(&mut cx).unwrap();
    InstanceQuery::new(PERSON).execute(&mut cx).unwrap();
    cx.commit().unwrap();

    let log = recorder.log();
    assert_eq!(log.len(), 4);
    assert_eq!(log[0], "BEGIN");
    assert_eq!(log[3], "COMMIT");
}

#[test]
fn failed_statement_rolls_back() {
    let (db, recorder) = recording_db();
    let mut cx = db.context();

    recorder.fail(Error::statement_failed(
        "select",
        std::io::Error::new(std::io::ErrorKind::Other, "disk I/O error"),
    ));

    let err = InstanceQuery::new(PERSON).execute(&mut cx).unwrap_err();
    assert!(err.any(Error::is_statement_failed));

    assert_eq!(recorder.log().last().map(String::as_str), Some("ROLLBACK"));
    assert!(!cx.is_opened());
}

#[test]
fn rows_become_instances() {
    let (db, recorder) = recording_db();
    let mut cx = db.context_for(Session::new("en").company(7));

    recorder.respond(
        2,
        vec![
            vec![Value::I64(11), Value::I64(21)],
            vec![Value::I64(12), Value::I64(23)],
        ],
    );

    let instances = InstanceQuery::new(DOCUMENT).execute(&mut cx).unwrap();
    assert_eq!(
        instances,
        vec![Instance::new(INVOICE, 11), Instance::new(OFFER, 12)]
    );
}

#[test]
fn non_integer_id_is_an_invalid_result() {
    let (db, recorder) = recording_db();
    let mut cx = db.context();

    recorder.respond(1, vec![vec![Value::from("x")]]);

    let err = InstanceQuery::new(PERSON).execute(&mut cx).unwrap_err();
    assert!(err.is_invalid_result());
    assert!(!cx.is_opened());
    assert_eq!(
        recorder.log(),
        vec![
            transaction_log(Transaction::Start),
            r#"select "T0"."ID" from "T_PERSON" "T0""#.to_string(),
            transaction_log(Transaction::Rollback),
        ]
    );
}

#[test]
fn cursor_walks_instances() {
    let fixture = sqlite();
    let mut cx = fixture.db.context();

    let mut builder = QueryBuilder::by_name(fixture.db.schema(), "Person").unwrap();
    builder.add_where_attr_eq_value("Status", "Active").unwrap();
    let query = builder.get_query();
    query.execute(&mut cx).unwrap();

    let mut seen = vec![];
    while query.next() {
        seen.push(query.current_instance().unwrap().id);
    }
    seen.sort();

    assert_eq!(seen, vec![1, 3]);
    assert_eq!(query.current_instance(), None);
    assert!(!query.next());

    query.execute(&mut cx).unwrap();
    assert!(query.next());
}

#[test]
fn limit_and_distinct() {
    let fixture = sqlite();
    let mut cx = fixture.db.context();

    let mut query = InstanceQuery::new(PERSON);
    query.limit(Some(2)).distinct(true);

    assert_eq!(
        query.inline_sql(&cx).unwrap(),
        r#"select distinct "T0"."ID" from "T_PERSON" "T0" limit 2"#
    );
    assert_eq!(query.execute(&mut cx).unwrap().len(), 2);
}

#[test]
fn classification_over_sqlite() {
    let fixture = sqlite();
    let mut cx = fixture.db.context();

    let mut builder = QueryBuilder::by_name(fixture.db.schema(), "Person").unwrap();
    builder.add_where_classification([CLASS_COLOR]);
    assert_eq!(
        sorted(builder.get_query().execute(&mut cx).unwrap()),
        vec![Instance::new(PERSON, 1), Instance::new(PERSON, 2)]
    );

    let mut builder = QueryBuilder::by_name(fixture.db.schema(), "Person").unwrap();
    builder.add_where_classification([CLASS_RED, CLASS_SIZE]);
    assert_eq!(
        sorted(builder.get_query().execute(&mut cx).unwrap()),
        vec![Instance::new(PERSON, 1), Instance::new(PERSON, 3)]
    );
}

#[test]
fn in_query_over_sqlite() {
    let fixture = sqlite();
    let mut cx = fixture.db.context();

    let links = AttributeQuery::new(CLASS_REL, "Link").with_where(QPart::equal(
        "ClassType",
        vec![QValue::Number(Value::I64(CLASS_COLOR.0))],
    ));

    let mut builder = QueryBuilder::by_name(fixture.db.schema(), "Person").unwrap();
    builder.add_where_attr_not_in_query("ID", links);

    assert_eq!(
        sorted(builder.get_query().execute(&mut cx).unwrap()),
        vec![Instance::new(PERSON, 1), Instance::new(PERSON, 3)]
    );
}

#[test]
fn bit_values_over_sqlite() {
    let fixture = sqlite();
    let mut cx = fixture.db.context_for(Session::new("en").company(7));
    let tue = fixture
        .db
        .schema()
        .bit_enum(WEEKDAYS)
        .flag("Tue")
        .unwrap()
        .clone();

    let mut builder = QueryBuilder::by_name(fixture.db.schema(), "Document").unwrap();
    builder.add_where_attr_eq_value("Days", tue).unwrap();

    assert_eq!(
        sorted(builder.get_query().execute(&mut cx).unwrap()),
        vec![Instance::new(INVOICE, 1), Instance::new(RECEIPT, 2)]
    );
}

#[test]
fn attribute_query_returns_values() {
    let fixture = sqlite();
    let mut cx = fixture.db.context();

    let mut builder = QueryBuilder::by_name(fixture.db.schema(), "Person").unwrap();
    builder.add_where_attr_eq_value("Status", "Active").unwrap();

    let mut names = builder.attribute_query("Name").execute(&mut cx).unwrap();
    names.sort_by(|a, b| a.as_str().cmp(&b.as_str()));

    assert_eq!(names, vec![Value::from("Alice"), Value::from("alina")]);
}

#[derive(Debug)]
struct EvenIdsOnly;

impl AccessCheck for EvenIdsOnly {
    fn filter(
        &self,
        _schema: &Schema,
        _session: &Session,
        instances: Vec<Instance>,
    ) -> Result<Vec<Instance>> {
        Ok(instances
            .into_iter()
            .filter(|instance| instance.id % 2 == 0)
            .collect())
    }
}

#[test]
fn access_check_filters_instances() {
    let recorder = Recorder::new();
    let db = Db::builder()
        .access_check(EvenIdsOnly)
        .build(schema(), recorder.clone())
        .unwrap();
    let mut cx = db.context();

    let rows = || {
        vec![
            vec![Value::I64(1)],
            vec![Value::I64(2)],
            vec![Value::I64(3)],
            vec![Value::I64(4)],
        ]
    };

    recorder.respond(1, rows());
    let mut query = InstanceQuery::new(PERSON);
    assert_eq!(
        query.execute(&mut cx).unwrap(),
        vec![Instance::new(PERSON, 2), Instance::new(PERSON, 4)]
    );

    recorder.respond(1, rows());
    assert_eq!(query.execute_without_access_check(&mut cx).unwrap().len(), 4);
}

#[derive(Debug)]
struct Deny;

impl AccessCheck for Deny {
    fn filter(&self, _: &Schema, _: &Session, _: Vec<Instance>) -> Result<Vec<Instance>> {
        Err(Error::invalid_statement("access check unavailable"))
    }
}

#[test]
fn failed_access_check_aborts() {
    let recorder = Recorder::new();
    let db = Db::builder()
        .access_check(Deny)
        .build(schema(), recorder.clone())
        .unwrap();
    let mut cx = db.context();

    recorder.respond(1, vec![vec![Value::I64(1)]]);
    let err = InstanceQuery::new(PERSON).execute(&mut cx).unwrap_err();

    assert!(err.is_invalid_statement());
    assert!(!cx.is_opened());
    assert_eq!(
        recorder.log().last(),
        Some(&transaction_log(Transaction::Rollback))
    );
}

#[test]
fn failed_preparation_can_be_retried() {
    let (db, _) = recording_db();
    let mut cx = db.context();

    let contacts = QueryBuilder::by_name(db.schema(), "Document").unwrap();

    let mut builder = QueryBuilder::by_name(db.schema(), "Document").unwrap();
    builder
        .company_dependent(false)
        .add_where_attr_in_query("Contact", contacts.attribute_query("Contact"));
    let query = builder.get_query();

    let err = query.inline_sql(&cx).unwrap_err();
    assert!(err.is_missing_company());
    assert!(!query.is_prepared());

    cx.set_company(Some(7));
    let sql = query.inline_sql(&cx).unwrap();

    assert_eq!(
        sql,
        r#"select "T0"."ID", "T0"."TYPEID" from "T_DOC" "T0" where "T0"."TYPEID" in (20, 21, 22, 23) and "T0"."CONTACTID" in (select "T0"."CONTACTID" from "T_DOC" "T0" where "T0"."TYPEID" in (20, 21, 22, 23) and "T0"."COMPANYID"=7)"#
    );
}
