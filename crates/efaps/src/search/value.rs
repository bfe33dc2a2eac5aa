use super::compare::CompareOp;
use crate::{
    db::QueryEnv,
    schema::{Attribute, AttributeKind, BitEnum, BitFlag, ColumnType},
    Error, Instance, Result, Value,
};

use std::collections::BTreeSet;
use tracing::warn;
use uuid::Uuid;

/// A value node of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum QValue {
    /// Text, possibly rewritten on preparation
    String(QStringValue),

    /// Integer or decimal literal
    Number(Value),

    Boolean(bool),

    /// A `Date` or `DateTime`
    DateTime(Value),

    /// A constant of a bit enum, matching every stored bit set selecting it
    Bit(QBitValue),

    /// SQL `null`
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QStringValue {
    raw: String,

    /// Value bound to the statement, set on preparation
    resolved: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QBitValue {
    flag: BitFlag,

    /// Stored values selecting the flag, set on preparation
    values: Vec<i64>,
}

/// Comparison settings a value is prepared under.
pub(crate) struct ValueCx<'a, 'b> {
    pub(crate) env: QueryEnv<'a>,
    pub(crate) op: CompareOp,
    pub(crate) ignore_case: bool,
    pub(crate) attribute: &'a Attribute,

    /// Bit sets already matched by an earlier value of the same comparison
    pub(crate) added_bits: &'b mut BTreeSet<i64>,
}

impl QValue {
    pub fn string(value: impl Into<String>) -> QValue {
        QValue::String(QStringValue::new(value))
    }

    pub fn bit(flag: BitFlag) -> QValue {
        QValue::Bit(QBitValue::new(flag))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, QValue::Null)
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            QValue::String(_) => "String",
            QValue::Number(_) => "Number",
            QValue::Boolean(_) => "Boolean",
            QValue::DateTime(_) => "DateTime",
            QValue::Bit(_) => "Flag",
            QValue::Null => "Null",
        }
    }

    pub(crate) fn prepare(&mut self, cx: &mut ValueCx<'_, '_>) -> Result<()> {
        match self {
            QValue::String(value) => value.prepare(cx),
            QValue::Number(value) => {
                if let Value::Instance(instance) = value {
                    *value = Value::I64(instance.id);
                }
                Ok(())
            }
            QValue::DateTime(value) => {
                if cx.attribute.column_type() == ColumnType::Date {
                    if let Value::DateTime(timestamp) = value {
                        *value = Value::Date(timestamp.date());
                    }
                }
                Ok(())
            }
            QValue::Bit(value) => value.prepare(cx),
            QValue::Boolean(_) | QValue::Null => Ok(()),
        }
    }

    /// Values bound to the statement. Bit values expand to every matching
    /// bit set; `Null` contributes nothing.
    pub(crate) fn sql_values(&self) -> Vec<Value> {
        match self {
            QValue::String(value) => vec![value.value()],
            QValue::Number(value) | QValue::DateTime(value) => vec![value.clone()],
            QValue::Boolean(value) => vec![Value::Bool(*value)],
            QValue::Bit(value) => value.values.iter().copied().map(Value::I64).collect(),
            QValue::Null => vec![],
        }
    }
}

impl QStringValue {
    pub fn new(raw: impl Into<String>) -> QStringValue {
        QStringValue {
            raw: raw.into(),
            resolved: None,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_prepared(&self) -> bool {
        self.resolved.is_some()
    }

    /// The value bound to the statement.
    pub fn value(&self) -> Value {
        match &self.resolved {
            Some(value) => value.clone(),
            None => Value::String(self.raw.clone()),
        }
    }

    fn prepare(&mut self, cx: &mut ValueCx<'_, '_>) -> Result<()> {
        if self.resolved.is_some() {
            return Ok(());
        }

        let mut text = if cx.ignore_case {
            upper_case(&self.raw, &cx.env.session.locale)
        } else {
            self.raw.clone()
        };

        if cx.op == CompareOp::Match {
            text = like_pattern(&text);
            self.resolved = Some(Value::String(text));
            return Ok(());
        }

        let resolved = match &cx.attribute.kind {
            AttributeKind::Status { group } => match cx.env.schema.status_id(group, &self.raw) {
                Some(id) => Value::I64(id),
                None => match self.raw.parse::<i64>() {
                    Ok(id) => Value::I64(id),
                    Err(_) => {
                        warn!(
                            status = %self.raw,
                            group = %group,
                            attribute = %cx.attribute.name,
                            "unknown status key; comparing as text"
                        );
                        Value::String(text)
                    }
                },
            },
            AttributeKind::Link { .. } | AttributeKind::Id | AttributeKind::Company => {
                match Instance::from_oid(&self.raw) {
                    Ok(instance) => Value::I64(instance.id),
                    Err(_) => self.raw.parse::<i64>().map(Value::I64).unwrap_or(Value::String(text)),
                }
            }
            AttributeKind::Type => Value::I64(resolve_type(cx.env, &self.raw)?),
            _ => Value::String(text),
        };

        self.resolved = Some(resolved);
        Ok(())
    }
}

impl QBitValue {
    pub fn new(flag: BitFlag) -> QBitValue {
        QBitValue {
            flag,
            values: vec![],
        }
    }

    pub fn flag(&self) -> &BitFlag {
        &self.flag
    }

    /// Stored bit sets this value matches, after preparation.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    fn prepare(&mut self, cx: &mut ValueCx<'_, '_>) -> Result<()> {
        let bit_enum = match &cx.attribute.kind {
            AttributeKind::BitEnum(id) if *id == self.flag.enum_id => cx.env.schema.bit_enum(*id),
            _ => return Err(Error::unsupported_value("Flag", &cx.attribute.name)),
        };

        if !matches!(cx.op, CompareOp::Equal | CompareOp::NotEqual) {
            return Err(Error::unsupported_value("Flag", &cx.attribute.name));
        }

        self.values = selecting(bit_enum, &self.flag, cx.added_bits);
        Ok(())
    }
}

/// Bit sets selecting `flag` that no earlier value of the comparison has
/// claimed yet.
fn selecting(bit_enum: &BitEnum, flag: &BitFlag, added: &mut BTreeSet<i64>) -> Vec<i64> {
    bit_enum
        .values_selecting(flag)
        .into_iter()
        .filter(|value| added.insert(*value))
        .collect()
}

fn resolve_type(env: QueryEnv<'_>, raw: &str) -> Result<i64> {
    if let Ok(uuid) = Uuid::parse_str(raw) {
        return Ok(env.schema.type_by_uuid(&uuid)?.id.0);
    }

    match env.schema.type_by_name(raw) {
        Ok(ty) => Ok(ty.id.0),
        Err(err) => raw.parse::<i64>().map_err(|_| err),
    }
}

/// Upper-cases `value` following the rules of `locale`.
///
/// Turkish and Azeri map the dotted `i` to `İ`.
pub(crate) fn upper_case(value: &str, locale: &str) -> String {
    let language = locale.split(['_', '-']).next().unwrap_or_default();

    if language.eq_ignore_ascii_case("tr") || language.eq_ignore_ascii_case("az") {
        value.replace('i', "İ").to_uppercase()
    } else {
        value.to_uppercase()
    }
}

/// Converts user wildcards (`*`, `?`) to a `like` pattern escaped with `\`.
pub(crate) fn like_pattern(value: &str) -> String {
    let mut ret = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '\\' | '%' | '_' => {
                ret.push('\\');
                ret.push(c);
            }
            '*' => ret.push('%'),
            '?' => ret.push('_'),
            c => ret.push(c),
        }
    }

    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_become_like_syntax() {
        assert_eq!(like_pattern("Al*"), "Al%");
        assert_eq!(like_pattern("A?ice"), "A_ice");
        assert_eq!(like_pattern("50%_off\\*"), "50\\%\\_off\\\\%");
    }

    #[test]
    fn upper_case_follows_locale() {
        assert_eq!(upper_case("istanbul", "en"), "ISTANBUL");
        assert_eq!(upper_case("istanbul", "tr_TR"), "İSTANBUL");
        assert_eq!(upper_case("ılık", "tr"), "ILIK");
        assert_eq!(upper_case("straße", "de-DE"), "STRASSE");
    }
}
