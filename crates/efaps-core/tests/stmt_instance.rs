use efaps_core::schema::TypeId;
use efaps_core::stmt::{Instance, Value};
use pretty_assertions::assert_eq;

#[test]
fn parse_oid() {
    let instance = Instance::from_oid("1024.77").unwrap();
    assert_eq!(instance.ty, TypeId(1024));
    assert_eq!(instance.id, 77);
    assert_eq!(instance.oid(), "1024.77");
    assert_eq!("5.6".parse::<Instance>().unwrap(), Instance::new(5, 6));
}

#[test]
fn reject_malformed_oid() {
    for oid in ["", "12", "12.", ".5", "a.b", "1.2.3"] {
        let err = Instance::from_oid(oid).unwrap_err();
        assert!(err.is_invalid_oid(), "{oid}");
    }
    assert!(!Instance::is_oid("Alice"));
    assert!(Instance::is_oid("3.4"));
}

#[test]
fn value_conversions() {
    assert_eq!(Value::from(Some(5_i64)), Value::I64(5));
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Instance::new(1, 2)).as_i64(), Some(2));
    assert_eq!(Value::from(vec![1u8]).kind_name(), "Bytes");

    let date = chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let value = Value::from(date);
    assert_eq!(chrono::NaiveDate::try_from(value).unwrap(), date);
    assert!(chrono::NaiveDateTime::try_from(Value::I32(1)).is_err());
}
