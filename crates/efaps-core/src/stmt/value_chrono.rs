use chrono::{NaiveDate, NaiveDateTime};

use crate::stmt::Value;

macro_rules! impl_chrono_conversions {
    ($chrono:ty, $name:ident, $lit:literal) => {
        impl From<$chrono> for Value {
            fn from(value: $chrono) -> Self {
                Self::$name(value)
            }
        }

        impl TryFrom<Value> for $chrono {
            type Error = crate::Error;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value {
                    Value::$name(value) => Ok(value),
                    _ => Err(err!("value is not of type {}", $lit)),
                }
            }
        }
    };
}

impl_chrono_conversions!(NaiveDateTime, DateTime, "NaiveDateTime");
impl_chrono_conversions!(NaiveDate, Date, "NaiveDate");

/// Text form of a [`Value::Date`], used for literals and text storage.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Text form of a [`Value::DateTime`]. The fraction is omitted when zero.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
