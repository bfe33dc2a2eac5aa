use super::{Flavor, Formatter, ToSql};

use efaps_core::stmt;

pub trait Params {
    fn push(&mut self, param: &stmt::Value) -> Bind;
}

/// How a value ends up in the statement text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bind {
    /// Bound as the n-th parameter, counting from 1
    Placeholder(Placeholder),

    /// Rendered as an escaped literal
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder(pub usize);

/// Renders every value as a literal. The resulting text is meant for logs and
/// error messages, statements sent to a database bind their values.
#[derive(Debug, Default)]
pub struct Inline;

impl Params for Vec<stmt::Value> {
    fn push(&mut self, value: &stmt::Value) -> Bind {
        self.push(value.clone());
        Bind::Placeholder(Placeholder(self.len()))
    }
}

impl Params for Inline {
    fn push(&mut self, _: &stmt::Value) -> Bind {
        Bind::Inline
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: super::Params>(self, f: &mut Formatter<'_, P>) {
        use std::fmt::Write;

        let _ = match f.serializer.flavor {
            Flavor::Mysql => write!(&mut f.dst, "?"),
            Flavor::Postgresql => write!(&mut f.dst, "${}", self.0),
            Flavor::Sqlite => write!(&mut f.dst, "?{}", self.0),
        };
    }
}
