use super::InstanceQuery;
use crate::{db::QueryEnv, schema::TypeId, search::QPart, Context, Result, Value};

use efaps_core::stmt::SqlSelect;

/// Selects one attribute of the instances matching a predicate tree.
///
/// Mostly used as the sub-select of a membership test, see
/// [`QueryBuilder::add_where_attr_in_query`](super::QueryBuilder::add_where_attr_in_query).
#[derive(Debug, Clone)]
pub struct AttributeQuery {
    attribute: String,
    query: InstanceQuery,
}

impl AttributeQuery {
    pub fn new(base_type: impl Into<TypeId>, attribute: impl Into<String>) -> AttributeQuery {
        let attribute = attribute.into();
        AttributeQuery {
            query: InstanceQuery::for_attribute(base_type.into(), attribute.clone()),
            attribute,
        }
    }

    pub fn with_where(mut self, part: impl Into<Option<QPart>>) -> AttributeQuery {
        self.query = self.query.with_where(part);
        self
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The underlying query, for settings such as
    /// [`InstanceQuery::include_child_types`].
    pub fn query_mut(&mut self) -> &mut InstanceQuery {
        &mut self.query
    }

    pub fn prepare(&mut self, env: QueryEnv<'_>) -> Result<()> {
        self.query.prepare(env)
    }

    pub fn select(&self) -> Option<&SqlSelect> {
        self.query.select()
    }

    pub fn sql(&mut self, cx: &Context) -> Result<String> {
        self.query.sql(cx)
    }

    /// Runs the query and returns the attribute value of every matching row.
    pub fn execute(&mut self, cx: &mut Context) -> Result<Vec<Value>> {
        self.query.execute_values(cx)
    }
}
