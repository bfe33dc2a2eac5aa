use super::{
    value::{QValue, ValueCx},
    PrepareCx, QAttribute,
};
use crate::{Error, Result, Value};

use efaps_core::stmt::{SqlPart, SqlSelect};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompareOp {
    Equal,
    NotEqual,
    Greater,
    Less,
    Match,
}

/// Binds one attribute to one or more values.
///
/// The operator is carried by the enclosing [`QPart`](super::QPart).
/// Several values under an equality are a membership test.
#[derive(Debug, Clone)]
pub struct QAttrCompare {
    attribute: QAttribute,
    values: Vec<QValue>,
    ignore_case: bool,
}

impl QAttrCompare {
    pub fn new(attribute: impl Into<String>, values: Vec<QValue>) -> QAttrCompare {
        QAttrCompare {
            attribute: QAttribute::new(attribute),
            values,
            ignore_case: false,
        }
    }

    /// Compares upper-cased column and value.
    pub fn ignore_case(&mut self, ignore_case: bool) -> &mut Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn is_ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub fn add_value(&mut self, value: QValue) -> &mut Self {
        self.values.push(value);
        self
    }

    pub fn attribute(&self) -> &QAttribute {
        &self.attribute
    }

    pub fn values(&self) -> &[QValue] {
        &self.values
    }

    pub(crate) fn prepare(&mut self, op: CompareOp, cx: &mut PrepareCx<'_, '_>) -> Result<()> {
        self.attribute.prepare(cx)?;
        let name = self.attribute.name();

        if self.values.is_empty() {
            return Err(Error::invalid_statement(format!(
                "comparison on `{name}` has no value"
            )));
        }

        if matches!(op, CompareOp::Greater | CompareOp::Less) && self.values.len() != 1 {
            return Err(Error::invalid_statement(format!(
                "range comparison on `{name}` takes exactly one value; got {}",
                self.values.len()
            )));
        }

        if matches!(op, CompareOp::Greater | CompareOp::Less | CompareOp::Match) {
            if let Some(value) = self.values.iter().find(|value| value.is_null()) {
                return Err(Error::unsupported_value(value.kind_name(), name));
            }
        }

        let Some(attribute) = self.attribute.attribute() else {
            return Err(Error::invalid_statement(format!("attribute `{name}` unresolved")));
        };

        let mut added_bits = BTreeSet::new();
        let mut value_cx = ValueCx {
            env: cx.env,
            op,
            ignore_case: self.ignore_case,
            attribute,
            added_bits: &mut added_bits,
        };

        for value in &mut self.values {
            value.prepare(&mut value_cx)?;
        }

        Ok(())
    }

    pub(crate) fn append_sql(&self, op: CompareOp, select: &mut SqlSelect) -> Result<()> {
        let column = self.attribute.column()?;

        let mut values = vec![];
        let mut has_null = false;
        for value in &self.values {
            has_null |= value.is_null();
            values.extend(value.sql_values());
        }

        match op {
            CompareOp::Equal | CompareOp::NotEqual => {
                let negated = op == CompareOp::NotEqual;
                let both = has_null && !values.is_empty();

                if !has_null && values.is_empty() {
                    return Err(Error::invalid_statement(format!(
                        "comparison on `{}` matches no value",
                        self.attribute.name()
                    )));
                }

                if both {
                    select.push(SqlPart::ParenOpen);
                }

                match values.len() {
                    0 => {}
                    1 => {
                        self.push_column(select, column.clone());
                        select.push(if negated { SqlPart::NotEqual } else { SqlPart::Equal });
                        select.push(SqlPart::Value(values.remove(0)));
                    }
                    _ => {
                        self.push_column(select, column.clone());
                        select.push(if negated { SqlPart::NotIn } else { SqlPart::In });
                        select.push(SqlPart::Value(Value::List(values)));
                    }
                }

                if both {
                    select.push(if negated { SqlPart::And } else { SqlPart::Or });
                }

                if has_null {
                    select.push(column);
                    select.push(if negated { SqlPart::IsNotNull } else { SqlPart::IsNull });
                }

                if both {
                    select.push(SqlPart::ParenClose);
                }
            }
            CompareOp::Greater | CompareOp::Less => {
                let value = values.into_iter().next().unwrap_or_default();
                self.push_column(select, column);
                select.push(if op == CompareOp::Greater {
                    SqlPart::Greater
                } else {
                    SqlPart::Less
                });
                select.push(SqlPart::Value(value));
            }
            CompareOp::Match => {
                let grouped = values.len() > 1;
                if grouped {
                    select.push(SqlPart::ParenOpen);
                }

                for (i, value) in values.into_iter().enumerate() {
                    if i > 0 {
                        select.push(SqlPart::Or);
                    }
                    self.push_column(select, column.clone());
                    select.push(SqlPart::Like);
                    select.push(SqlPart::Value(value));
                    select.push(SqlPart::LikeEscape);
                }

                if grouped {
                    select.push(SqlPart::ParenClose);
                }
            }
        }

        Ok(())
    }

    fn push_column(&self, select: &mut SqlSelect, column: SqlPart) {
        if self.ignore_case {
            select.push(SqlPart::Upper);
            select.push(column);
            select.push(SqlPart::ParenClose);
        } else {
            select.push(column);
        }
    }
}
