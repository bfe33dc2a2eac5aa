use super::Instance;
use crate::schema::{BitFlag, TypeId};

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

/// A host value, either handed to the query builder or read back from a row.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Null value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// Floating point number
    F64(f64),

    /// String value
    String(String),

    /// Calendar date without time zone
    Date(NaiveDate),

    /// Timestamp without time zone
    DateTime(NaiveDateTime),

    /// A UUID, used to refer to types
    Uuid(Uuid),

    /// A business object handle
    Instance(Instance),

    /// A type id
    Type(TypeId),

    /// A constant of a bit enum
    Flag(BitFlag),

    /// Raw bytes
    Bytes(Vec<u8>),

    /// A list of values
    List(Vec<Value>),
}

impl Value {
    pub const fn null() -> Value {
        Value::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::I32(_) => "I32",
            Value::I64(_) => "I64",
            Value::F64(_) => "F64",
            Value::String(_) => "String",
            Value::Date(_) => "Date",
            Value::DateTime(_) => "DateTime",
            Value::Uuid(_) => "Uuid",
            Value::Instance(_) => "Instance",
            Value::Type(_) => "Type",
            Value::Flag(_) => "Flag",
            Value::Bytes(_) => "Bytes",
            Value::List(_) => "List",
        }
    }

    /// Integer view of the value. Booleans map to 0/1.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            Value::Bool(v) => Some(i64::from(*v)),
            Value::Type(id) => Some(id.0),
            Value::Instance(instance) => Some(instance.id),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            Value::I32(v) => Some(f64::from(*v)),
            Value::I64(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::I32(v) => Some(*v != 0),
            Value::I64(v) => Some(*v != 0),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Value {
        Value::Bool(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Value {
        Value::I32(src)
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Value {
        Value::I64(src)
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Value {
        Value::F64(src)
    }
}

impl From<String> for Value {
    fn from(src: String) -> Value {
        Value::String(src)
    }
}

impl From<&String> for Value {
    fn from(src: &String) -> Value {
        Value::String(src.clone())
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Value {
        Value::String(src.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(src: Uuid) -> Value {
        Value::Uuid(src)
    }
}

impl From<Instance> for Value {
    fn from(src: Instance) -> Value {
        Value::Instance(src)
    }
}

impl From<TypeId> for Value {
    fn from(src: TypeId) -> Value {
        Value::Type(src)
    }
}

impl From<BitFlag> for Value {
    fn from(src: BitFlag) -> Value {
        Value::Flag(src)
    }
}

impl From<&BitFlag> for Value {
    fn from(src: &BitFlag) -> Value {
        Value::Flag(src.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(src: Vec<u8>) -> Value {
        Value::Bytes(src)
    }
}

impl From<Vec<Value>> for Value {
    fn from(src: Vec<Value>) -> Value {
        Value::List(src)
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(value: Option<T>) -> Value {
        match value {
            Some(value) => Value::from(value),
            None => Value::Null,
        }
    }
}
