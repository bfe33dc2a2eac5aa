use super::{compare::CompareOp, PrepareCx, QAttrCompare, QClassEqual, QIn, QValue};
use crate::Result;

use efaps_core::stmt::{SqlPart, SqlSelect};

/// A node of the predicate tree.
///
/// Children of `And`/`Or` render in insertion order; nested combinators are
/// parenthesized.
#[derive(Debug, Clone)]
pub enum QPart {
    And(Vec<QPart>),
    Or(Vec<QPart>),
    Equal(QAttrCompare),
    NotEqual(QAttrCompare),
    Greater(QAttrCompare),
    Less(QAttrCompare),
    Match(QAttrCompare),
    ClassEqual(QClassEqual),
    In(QIn),
}

impl QPart {
    pub fn equal(attribute: impl Into<String>, values: Vec<QValue>) -> QPart {
        QPart::Equal(QAttrCompare::new(attribute, values))
    }

    pub fn not_equal(attribute: impl Into<String>, values: Vec<QValue>) -> QPart {
        QPart::NotEqual(QAttrCompare::new(attribute, values))
    }

    pub fn greater(attribute: impl Into<String>, value: QValue) -> QPart {
        QPart::Greater(QAttrCompare::new(attribute, vec![value]))
    }

    pub fn less(attribute: impl Into<String>, value: QValue) -> QPart {
        QPart::Less(QAttrCompare::new(attribute, vec![value]))
    }

    pub fn matches(attribute: impl Into<String>, values: Vec<QValue>) -> QPart {
        QPart::Match(QAttrCompare::new(attribute, values))
    }

    /// Returns `true` for combinators without any comparison below them.
    pub fn is_empty(&self) -> bool {
        match self {
            QPart::And(parts) | QPart::Or(parts) => parts.iter().all(QPart::is_empty),
            _ => false,
        }
    }

    pub(crate) fn prepare(&mut self, cx: &mut PrepareCx<'_, '_>) -> Result<()> {
        match self {
            QPart::And(parts) | QPart::Or(parts) => {
                for part in parts {
                    part.prepare(cx)?;
                }
                Ok(())
            }
            QPart::Equal(compare) => compare.prepare(CompareOp::Equal, cx),
            QPart::NotEqual(compare) => compare.prepare(CompareOp::NotEqual, cx),
            QPart::Greater(compare) => compare.prepare(CompareOp::Greater, cx),
            QPart::Less(compare) => compare.prepare(CompareOp::Less, cx),
            QPart::Match(compare) => compare.prepare(CompareOp::Match, cx),
            QPart::ClassEqual(class) => class.prepare(cx),
            QPart::In(part) => part.prepare(cx),
        }
    }

    /// Appends the tree to the `where` clause of `select`.
    pub(crate) fn append_sql(&self, select: &mut SqlSelect) -> Result<()> {
        self.append(select, false)
    }

    fn append(&self, select: &mut SqlSelect, nested: bool) -> Result<()> {
        match self {
            QPart::And(parts) => append_all(parts, SqlPart::And, select, nested),
            QPart::Or(parts) => append_all(parts, SqlPart::Or, select, nested),
            QPart::Equal(compare) => compare.append_sql(CompareOp::Equal, select),
            QPart::NotEqual(compare) => compare.append_sql(CompareOp::NotEqual, select),
            QPart::Greater(compare) => compare.append_sql(CompareOp::Greater, select),
            QPart::Less(compare) => compare.append_sql(CompareOp::Less, select),
            QPart::Match(compare) => compare.append_sql(CompareOp::Match, select),
            QPart::ClassEqual(class) => class.append_sql(select),
            QPart::In(part) => part.append_sql(select),
        }
    }
}

fn append_all(parts: &[QPart], op: SqlPart, select: &mut SqlSelect, nested: bool) -> Result<()> {
    let parts: Vec<_> = parts.iter().filter(|part| !part.is_empty()).collect();
    let grouped = nested && parts.len() > 1;

    if grouped {
        select.push(SqlPart::ParenOpen);
    }

    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            select.push(op.clone());
        }
        part.append(select, parts.len() > 1 || nested)?;
    }

    if grouped {
        select.push(SqlPart::ParenClose);
    }

    Ok(())
}
