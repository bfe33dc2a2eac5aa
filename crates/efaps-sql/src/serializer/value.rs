use super::{Bind, Comma, Flavor, Formatter, Params, ToSql};

use efaps_core::stmt::{self, DATE_FORMAT, DATE_TIME_FORMAT};

impl ToSql for &stmt::Value {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        use stmt::Value::*;

        match self {
            List(values) => fmt!(f, "(" Comma(values) ")"),
            value => match f.params.push(value) {
                Bind::Placeholder(placeholder) => fmt!(f, placeholder),
                Bind::Inline => fmt!(f, Literal(value)),
            },
        }
    }
}

/// A value rendered as an escaped literal of the serializer's dialect
struct Literal<'a>(&'a stmt::Value);

impl ToSql for Literal<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        use std::fmt::Write;
        use stmt::Value::*;

        let flavor = f.serializer.flavor;

        match self.0 {
            Null => fmt!(f, "null"),
            Bool(value) => match flavor {
                Flavor::Postgresql => fmt!(f, if *value { "true" } else { "false" }),
                Flavor::Sqlite | Flavor::Mysql => fmt!(f, if *value { "1" } else { "0" }),
            },
            I32(value) => {
                let _ = write!(f.dst, "{value}");
            }
            I64(value) => {
                let _ = write!(f.dst, "{value}");
            }
            F64(value) => {
                let _ = write!(f.dst, "{value}");
            }
            String(value) => fmt!(f, Quoted(value)),
            Date(value) => {
                if !matches!(flavor, Flavor::Sqlite) {
                    fmt!(f, "date ");
                }
                fmt!(f, Quoted(&value.format(DATE_FORMAT).to_string()));
            }
            DateTime(value) => {
                if !matches!(flavor, Flavor::Sqlite) {
                    fmt!(f, "timestamp ");
                }
                fmt!(f, Quoted(&value.format(DATE_TIME_FORMAT).to_string()));
            }
            Uuid(value) => fmt!(f, Quoted(&value.to_string())),
            Instance(value) => {
                let _ = write!(f.dst, "{}", value.id);
            }
            Type(value) => {
                let _ = write!(f.dst, "{}", value.0);
            }
            Flag(value) => {
                let _ = write!(f.dst, "{}", value.value);
            }
            Bytes(value) => {
                let hex: std::string::String =
                    value.iter().map(|byte| format!("{byte:02x}")).collect();
                match flavor {
                    Flavor::Postgresql => {
                        let _ = write!(f.dst, "'\\x{hex}'");
                    }
                    Flavor::Sqlite | Flavor::Mysql => {
                        let _ = write!(f.dst, "x'{hex}'");
                    }
                }
            }
            List(values) => fmt!(f, "(" Comma(values.iter().map(Literal)) ")"),
        }
    }
}

/// A single quoted string literal
struct Quoted<'a>(&'a str);

impl ToSql for Quoted<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let mysql = f.serializer.is_mysql();

        f.dst.push('\'');
        for c in self.0.chars() {
            match c {
                '\'' => f.dst.push_str("''"),
                '\\' if mysql => f.dst.push_str("\\\\"),
                c => f.dst.push(c),
            }
        }
        f.dst.push('\'');
    }
}
