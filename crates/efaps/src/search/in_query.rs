use super::{PrepareCx, QAttribute};
use crate::{query::AttributeQuery, Error, Result};

use efaps_core::stmt::{SqlPart, SqlSelect};

/// `attribute in (select ...)`, the sub-select being an [`AttributeQuery`]
/// prepared with its own aliases.
#[derive(Debug, Clone)]
pub struct QIn {
    attribute: QAttribute,
    negated: bool,
    query: Box<AttributeQuery>,
}

impl QIn {
    pub fn new(attribute: impl Into<String>, query: AttributeQuery) -> QIn {
        QIn {
            attribute: QAttribute::new(attribute),
            negated: false,
            query: Box::new(query),
        }
    }

    pub fn negated(mut self, negated: bool) -> QIn {
        self.negated = negated;
        self
    }

    pub fn attribute(&self) -> &QAttribute {
        &self.attribute
    }

    pub fn query(&self) -> &AttributeQuery {
        &self.query
    }

    pub(crate) fn prepare(&mut self, cx: &mut PrepareCx<'_, '_>) -> Result<()> {
        self.attribute.prepare(cx)?;
        self.query.prepare(cx.env)
    }

    pub(crate) fn append_sql(&self, select: &mut SqlSelect) -> Result<()> {
        let Some(sub) = self.query.select() else {
            return Err(Error::invalid_statement(format!(
                "sub-query on `{}` used before preparation",
                self.attribute.name()
            )));
        };

        select
            .push(self.attribute.column()?)
            .push(if self.negated { SqlPart::NotIn } else { SqlPart::In })
            .push(SqlPart::ParenOpen)
            .push(SqlPart::SubSelect(Box::new(sub.clone())))
            .push(SqlPart::ParenClose);

        Ok(())
    }
}
