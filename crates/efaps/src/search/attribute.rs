use super::PrepareCx;
use crate::{
    schema::{Attribute, AttributeKind},
    Error, Result,
};

use efaps_core::stmt::SqlPart;

/// An attribute reference, resolved against the queried type on
/// preparation.
#[derive(Debug, Clone)]
pub struct QAttribute {
    name: String,
    resolved: Option<Resolved>,
}

#[derive(Debug, Clone)]
struct Resolved {
    attribute: Attribute,
    table_index: usize,
}

impl QAttribute {
    pub fn new(name: impl Into<String>) -> QAttribute {
        QAttribute {
            name: name.into(),
            resolved: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved attribute, once prepared.
    pub fn attribute(&self) -> Option<&Attribute> {
        self.resolved.as_ref().map(|resolved| &resolved.attribute)
    }

    pub fn table_index(&self) -> Option<usize> {
        self.resolved.as_ref().map(|resolved| resolved.table_index)
    }

    pub(crate) fn kind(&self) -> Option<&AttributeKind> {
        self.attribute().map(|attr| &attr.kind)
    }

    pub(crate) fn prepare(&mut self, cx: &mut PrepareCx<'_, '_>) -> Result<()> {
        if self.resolved.is_some() {
            return Ok(());
        }

        let attribute = cx.ty.attribute(&self.name)?.clone();
        let table_index = cx.index.index_of(cx.env.schema.table(attribute.table));

        self.resolved = Some(Resolved {
            attribute,
            table_index,
        });
        Ok(())
    }

    pub(crate) fn column(&self) -> Result<SqlPart> {
        match &self.resolved {
            Some(resolved) => Ok(SqlPart::column(
                resolved.table_index,
                resolved.attribute.sql_col_name(),
            )),
            None => Err(Error::invalid_statement(format!(
                "attribute `{}` used before preparation",
                self.name
            ))),
        }
    }
}
