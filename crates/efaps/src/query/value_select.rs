use crate::{
    schema::{Attribute, AttributeKind, ColumnType, TableId, Type, TypeId},
    Error, Instance, Result, Schema, Value,
};

use efaps_core::stmt::{SelectColumn, SqlSelect};
use std::fmt::Write;

/// One step of a select expression such as `attribute[Date].format[%Y]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectStep {
    /// `attribute[Name]`
    Attribute(String),

    /// `linkfrom[Type#Attribute]`: instances of `ty` whose `attribute`
    /// links to the current instance
    LinkFrom { ty: String, attribute: String },

    /// `type`
    Type,

    /// `oid`
    Oid,

    /// `id`
    Id,

    /// `uuid`
    Uuid,

    /// `label`
    Label,

    /// `name`
    Name,

    /// `key` of a status
    Key,

    /// `format[pattern]`, a chrono format pattern
    Format(String),
}

/// A parsed select expression.
///
/// The first step decides which columns are read; the optional second step
/// converts the raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSelect {
    expr: String,
    steps: Vec<SelectStep>,
}

/// Where the raw data of a select comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
    /// Columns of the table
    Table(TableId),

    /// The instance handle alone
    Instance,

    /// A separate statement over the linking type
    LinkFrom,
}

impl ValueSelect {
    pub fn parse(expr: &str) -> Result<ValueSelect> {
        let steps = split(expr)?
            .into_iter()
            .map(|token| step(expr, token))
            .collect::<Result<Vec<_>>>()?;

        validate(expr, &steps)?;

        Ok(ValueSelect {
            expr: expr.to_string(),
            steps,
        })
    }

    /// Shorthand for `attribute[name]`.
    pub fn attribute(name: &str) -> ValueSelect {
        ValueSelect {
            expr: format!("attribute[{name}]"),
            steps: vec![SelectStep::Attribute(name.to_string())],
        }
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    pub fn steps(&self) -> &[SelectStep] {
        &self.steps
    }

    /// The select applied to the linking instances of a `linkfrom` select.
    pub(crate) fn tail(&self) -> ValueSelect {
        let steps = self.steps.get(1..).unwrap_or_default().to_vec();
        let expr = self
            .expr
            .split_once("].")
            .map(|(_, rest)| rest.to_string())
            .unwrap_or_default();

        ValueSelect { expr, steps }
    }

    pub(crate) fn source(&self, schema: &Schema, ty: &Type) -> Result<Source> {
        Ok(match self.steps.first() {
            Some(SelectStep::Attribute(name)) => Source::Table(ty.attribute(name)?.table),
            Some(SelectStep::Type) if schema.table(ty.main_table).sql_col_type.is_some() => {
                Source::Table(ty.main_table)
            }
            Some(SelectStep::LinkFrom { .. }) => Source::LinkFrom,
            _ => Source::Instance,
        })
    }

    /// Appends the columns this select reads to `select`, qualified by
    /// `table_index`. Returns the number of columns added.
    pub(crate) fn append(
        &self,
        schema: &Schema,
        ty: &Type,
        select: &mut SqlSelect,
        ret: &mut Vec<ColumnType>,
        table_index: usize,
    ) -> Result<usize> {
        let (column, column_type) = match self.steps.first() {
            Some(SelectStep::Attribute(name)) => {
                let attr = ty.attribute(name)?;
                self.check_leaf(attr)?;
                (attr.sql_col_name().to_string(), attr.column_type())
            }
            Some(SelectStep::Type) => match &schema.table(ty.main_table).sql_col_type {
                Some(column) => (column.clone(), ColumnType::Integer),
                None => return Ok(0),
            },
            Some(SelectStep::LinkFrom { .. }) => {
                return Err(Error::invalid_statement(format!(
                    "`{}` is read through its own statement",
                    self.expr
                )))
            }
            _ => return Ok(0),
        };

        select.columns.push(SelectColumn {
            table_index: Some(table_index),
            name: column,
        });
        ret.push(column_type);
        Ok(1)
    }

    /// Converts the columns read for `instance` into the selected value.
    pub(crate) fn value(
        &self,
        schema: &Schema,
        ty: &Type,
        instance: Instance,
        row: &[Value],
    ) -> Result<Value> {
        let leaf = self.steps.get(1);

        match self.steps.first() {
            Some(SelectStep::Attribute(name)) => {
                let attr = ty.attribute(name)?;
                let raw = row.first().cloned().unwrap_or_default();
                attribute_value(schema, attr, raw, leaf)
            }
            Some(SelectStep::Type) => {
                let id = row
                    .first()
                    .and_then(Value::as_i64)
                    .map(TypeId)
                    .unwrap_or(instance.ty);
                let ty = schema.ty(id)?;

                Ok(match leaf {
                    Some(SelectStep::Label) => Value::String(ty.label.clone()),
                    Some(SelectStep::Name) => Value::String(ty.name.clone()),
                    Some(SelectStep::Uuid) => Value::Uuid(ty.uuid),
                    Some(SelectStep::Id) => Value::I64(ty.id.0),
                    _ => Value::Type(ty.id),
                })
            }
            Some(SelectStep::Oid) => Ok(Value::String(instance.oid())),
            Some(SelectStep::Id) => Ok(Value::I64(instance.id)),
            _ => Err(Error::invalid_statement(format!(
                "`{}` cannot be read from a row",
                self.expr
            ))),
        }
    }

    fn check_leaf(&self, attr: &Attribute) -> Result<()> {
        let ok = match self.steps.get(1) {
            Some(SelectStep::Oid) => attr.is_link(),
            Some(SelectStep::Key) => attr.is_status(),
            Some(SelectStep::Format(_)) => {
                matches!(attr.column_type(), ColumnType::Date | ColumnType::DateTime)
            }
            _ => true,
        };

        if ok {
            Ok(())
        } else {
            Err(Error::invalid_statement(format!(
                "`{}` does not apply to attribute `{}`",
                self.expr, attr.name
            )))
        }
    }
}

fn attribute_value(
    schema: &Schema,
    attr: &Attribute,
    raw: Value,
    leaf: Option<&SelectStep>,
) -> Result<Value> {
    if raw.is_null() {
        return Ok(Value::Null);
    }

    match leaf {
        Some(SelectStep::Format(pattern)) => {
            let mut ret = String::new();
            let written = match &raw {
                Value::Date(value) => write!(ret, "{}", value.format(pattern)),
                Value::DateTime(value) => write!(ret, "{}", value.format(pattern)),
                _ => return Err(Error::unsupported_value(raw.kind_name(), &attr.name)),
            };

            written.map_err(|_| {
                Error::invalid_statement(format!("invalid format pattern `{pattern}`"))
            })?;
            Ok(Value::String(ret))
        }
        Some(SelectStep::Key) => {
            let status = raw.as_i64().and_then(|id| schema.status(id));
            match status {
                Some(status) => Ok(Value::String(status.key.clone())),
                None => Err(Error::invalid_result(format!(
                    "unknown status id for attribute `{}`",
                    attr.name
                ))),
            }
        }
        Some(SelectStep::Oid) => match (&attr.kind, raw.as_i64()) {
            (AttributeKind::Link { target }, Some(id)) => {
                Ok(Value::String(Instance::new(*target, id).oid()))
            }
            _ => Err(Error::unsupported_value(raw.kind_name(), &attr.name)),
        },
        _ => Ok(raw),
    }
}

/// Splits on `.` outside of brackets.
fn split(expr: &str) -> Result<Vec<&str>> {
    let mut ret = vec![];
    let mut depth = 0_usize;
    let mut start = 0;

    for (i, c) in expr.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| invalid(expr, "unbalanced `]`"))?;
            }
            '.' if depth == 0 => {
                ret.push(&expr[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(invalid(expr, "unbalanced `[`"));
    }

    ret.push(&expr[start..]);
    Ok(ret)
}

fn step(expr: &str, token: &str) -> Result<SelectStep> {
    let (name, arg) = match token.split_once('[') {
        Some((name, rest)) => match rest.strip_suffix(']') {
            Some(arg) => (name, Some(arg)),
            None => return Err(invalid(expr, "argument must end the step")),
        },
        None => (token, None),
    };

    let name = name.trim().to_ascii_lowercase();

    Ok(match (name.as_str(), arg) {
        ("attribute", Some(arg)) if !arg.is_empty() => SelectStep::Attribute(arg.to_string()),
        ("linkfrom", Some(arg)) => match arg.split_once('#') {
            Some((ty, attribute)) if !ty.is_empty() && !attribute.is_empty() => {
                SelectStep::LinkFrom {
                    ty: ty.to_string(),
                    attribute: attribute.to_string(),
                }
            }
            _ => return Err(invalid(expr, "`linkfrom` takes `Type#Attribute`")),
        },
        ("format", Some(arg)) => SelectStep::Format(arg.to_string()),
        ("type", None) => SelectStep::Type,
        ("oid", None) => SelectStep::Oid,
        ("id", None) => SelectStep::Id,
        ("uuid", None) => SelectStep::Uuid,
        ("label", None) => SelectStep::Label,
        ("name", None) => SelectStep::Name,
        ("key", None) => SelectStep::Key,
        _ => return Err(invalid(expr, &format!("unknown step `{token}`"))),
    })
}

fn validate(expr: &str, steps: &[SelectStep]) -> Result<()> {
    use SelectStep as S;

    let ok = match steps {
        [S::Attribute(_)] | [S::Type] | [S::Oid] | [S::Id] => true,
        [S::Attribute(_), S::Format(_) | S::Key | S::Oid] => true,
        [S::Type, S::Label | S::Name | S::Uuid | S::Id] => true,
        [S::LinkFrom { .. }, rest @ ..] => {
            !rest.is_empty()
                && !matches!(rest[0], S::LinkFrom { .. })
                && validate(expr, rest).is_ok()
        }
        _ => false,
    };

    if ok {
        Ok(())
    } else {
        Err(invalid(expr, "unsupported combination of steps"))
    }
}

fn invalid(expr: &str, reason: &str) -> Error {
    Error::invalid_statement(format!("invalid select `{expr}`: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chains() {
        let select = ValueSelect::parse("attribute[Date].format[%d.%m.%Y]").unwrap();
        assert_eq!(
            select.steps(),
            &[
                SelectStep::Attribute("Date".into()),
                SelectStep::Format("%d.%m.%Y".into())
            ]
        );

        let select = ValueSelect::parse("linkfrom[Position#Invoice].attribute[Quantity]").unwrap();
        assert_eq!(
            select.steps()[0],
            SelectStep::LinkFrom {
                ty: "Position".into(),
                attribute: "Invoice".into()
            }
        );
        assert_eq!(select.tail().expr(), "attribute[Quantity]");
        assert_eq!(select.tail().steps(), &[SelectStep::Attribute("Quantity".into())]);

        assert_eq!(ValueSelect::parse("type.label").unwrap().steps().len(), 2);
        assert_eq!(ValueSelect::parse("oid").unwrap().steps(), &[SelectStep::Oid]);
    }

    #[test]
    fn rejects_malformed_expressions() {
        for expr in [
            "attribute[Name",
            "attribute]Name[",
            "attribute",
            "oid.label",
            "type.format[%Y]",
            "linkfrom[Position]",
            "linkfrom[Position#Invoice]",
            "frobnicate",
        ] {
            let err = ValueSelect::parse(expr).unwrap_err();
            assert!(err.is_invalid_statement(), "{expr}: {err}");
        }
    }
}
