use chrono::{NaiveDate, NaiveDateTime};
use efaps_core::{
    schema::ColumnType,
    stmt::{self, Value as CoreValue, DATE_FORMAT, DATE_TIME_FORMAT},
    Error, Result,
};
use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
    Row,
};

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    /// Converts this SQLite driver value into the core value.
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Converts a SQLite value within a row to a core value of the column
    /// type the caller asked for.
    pub fn from_sql(row: &Row, index: usize, ty: ColumnType) -> Result<Self> {
        let value: SqlValue = row.get(index).map_err(Error::driver_operation_failed)?;

        let core_value = match value {
            SqlValue::Null => stmt::Value::Null,
            SqlValue::Integer(value) => match ty {
                ColumnType::Integer => stmt::Value::I64(value),
                ColumnType::Boolean => stmt::Value::Bool(value != 0),
                ColumnType::Real => stmt::Value::F64(value as f64),
                ColumnType::String => stmt::Value::String(value.to_string()),
                _ => return Err(mismatch(index, ty, "integer")),
            },
            SqlValue::Real(value) => match ty {
                ColumnType::Real => stmt::Value::F64(value),
                ColumnType::String => stmt::Value::String(value.to_string()),
                _ => return Err(mismatch(index, ty, "real")),
            },
            SqlValue::Text(value) => match ty {
                ColumnType::String => stmt::Value::String(value),
                ColumnType::DateTime => stmt::Value::DateTime(parse_date_time(&value, index)?),
                ColumnType::Date => stmt::Value::Date(parse_date(&value, index)?),
                ColumnType::Integer => stmt::Value::I64(
                    value
                        .trim()
                        .parse()
                        .map_err(|_| mismatch(index, ty, "text"))?,
                ),
                ColumnType::Real => stmt::Value::F64(
                    value
                        .trim()
                        .parse()
                        .map_err(|_| mismatch(index, ty, "text"))?,
                ),
                ColumnType::Boolean => match value.as_str() {
                    "1" | "true" | "TRUE" => stmt::Value::Bool(true),
                    "0" | "false" | "FALSE" => stmt::Value::Bool(false),
                    _ => return Err(mismatch(index, ty, "text")),
                },
                ColumnType::Bytes => stmt::Value::Bytes(value.into_bytes()),
            },
            SqlValue::Blob(value) => match ty {
                ColumnType::Bytes => stmt::Value::Bytes(value),
                _ => return Err(mismatch(index, ty, "blob")),
            },
        };

        Ok(Value(core_value))
    }
}

fn mismatch(index: usize, ty: ColumnType, stored: &str) -> Error {
    Error::invalid_result(format!(
        "column {index}: cannot read {stored} storage as {ty:?}"
    ))
}

// SQLite has no timestamp storage class. Timestamps are stored as text, with
// either a space or a `T` between date and time.
fn parse_date_time(text: &str, index: usize) -> Result<NaiveDateTime> {
    for format in [DATE_TIME_FORMAT, "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(value) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(value);
        }
    }

    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| mismatch(index, ColumnType::DateTime, "text"))
}

fn parse_date(text: &str, index: usize) -> Result<NaiveDate> {
    let date = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| mismatch(index, ColumnType::Date, "text"))
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use stmt::Value;

        match &self.0 {
            Value::Bool(true) => Ok(ToSqlOutput::Owned(SqlValue::Integer(1))),
            Value::Bool(false) => Ok(ToSqlOutput::Owned(SqlValue::Integer(0))),
            Value::I32(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            Value::I64(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            Value::F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            Value::String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            Value::Date(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(
                v.format(DATE_FORMAT).to_string(),
            ))),
            Value::DateTime(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(
                v.format(DATE_TIME_FORMAT).to_string(),
            ))),
            Value::Uuid(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(v.to_string()))),
            Value::Instance(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(v.id))),
            Value::Type(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(v.0))),
            Value::Flag(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(v.value))),
            Value::Bytes(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(&v[..]))),
            Value::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            Value::List(_) => Err(rusqlite::Error::ToSqlConversionFailure(
                "list values expand to one parameter per item".into(),
            )),
        }
    }
}
