use super::{AttributeQuery, InstanceQuery, MultiPrintQuery};
use crate::{
    schema::{Type, TypeId},
    search::{QAttrCompare, QClassEqual, QIn, QPart, QValue},
    Context, Error, Result, Schema, Value,
};

use uuid::Uuid;

/// Assembles the predicate tree of an [`InstanceQuery`] from host values.
///
/// Comparisons are combined with `and` unless [`set_or`](Self::set_or) is
/// set. The query is built on the first call to
/// [`get_query`](Self::get_query); comparisons added afterwards do not
/// change it.
#[derive(Debug)]
pub struct QueryBuilder {
    ty: TypeId,
    compares: Vec<QPart>,

    /// Latest attribute comparison, still reachable through the reference
    /// handed out when it was added
    last: Option<(fn(QAttrCompare) -> QPart, QAttrCompare)>,

    or: bool,
    include_child_types: Option<bool>,
    company_dependent: bool,
    query: Option<InstanceQuery>,
}

impl QueryBuilder {
    pub fn new(ty: &Type) -> QueryBuilder {
        QueryBuilder {
            ty: ty.id,
            compares: vec![],
            last: None,
            or: false,
            include_child_types: None,
            company_dependent: true,
            query: None,
        }
    }

    pub fn by_uuid(schema: &Schema, uuid: &Uuid) -> Result<QueryBuilder> {
        Ok(QueryBuilder::new(schema.type_by_uuid(uuid)?))
    }

    pub fn by_name(schema: &Schema, name: &str) -> Result<QueryBuilder> {
        Ok(QueryBuilder::new(schema.type_by_name(name)?))
    }

    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    /// Combines the comparisons with `or` instead of `and`.
    pub fn set_or(&mut self, or: bool) -> &mut Self {
        self.or = or;
        self
    }

    pub fn include_child_types(&mut self, include: bool) -> &mut Self {
        self.include_child_types = Some(include);
        self
    }

    pub fn company_dependent(&mut self, company_dependent: bool) -> &mut Self {
        self.company_dependent = company_dependent;
        self
    }

    pub fn add_where_attr_eq_value(
        &mut self,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Result<&mut QAttrCompare> {
        let values = to_qvalues(attribute, value.into())?;
        Ok(self.push_compare(QPart::Equal, QAttrCompare::new(attribute, values)))
    }

    pub fn add_where_attr_not_eq_value(
        &mut self,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Result<&mut QAttrCompare> {
        let values = to_qvalues(attribute, value.into())?;
        Ok(self.push_compare(QPart::NotEqual, QAttrCompare::new(attribute, values)))
    }

    pub fn add_where_attr_greater_value(
        &mut self,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Result<&mut QAttrCompare> {
        let value = to_qvalue(attribute, value.into())?;
        Ok(self.push_compare(QPart::Greater, QAttrCompare::new(attribute, vec![value])))
    }

    pub fn add_where_attr_less_value(
        &mut self,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Result<&mut QAttrCompare> {
        let value = to_qvalue(attribute, value.into())?;
        Ok(self.push_compare(QPart::Less, QAttrCompare::new(attribute, vec![value])))
    }

    /// Matches with wildcards: `*` for any run of characters, `?` for one
    /// character.
    pub fn add_where_attr_match_value(
        &mut self,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Result<&mut QAttrCompare> {
        let values = to_qvalues(attribute, value.into())?;
        Ok(self.push_compare(QPart::Match, QAttrCompare::new(attribute, values)))
    }

    pub fn add_where_attr_is_null(&mut self, attribute: &str) -> &mut QAttrCompare {
        self.push_compare(QPart::Equal, QAttrCompare::new(attribute, vec![QValue::Null]))
    }

    pub fn add_where_attr_is_not_null(&mut self, attribute: &str) -> &mut QAttrCompare {
        self.push_compare(QPart::NotEqual, QAttrCompare::new(attribute, vec![QValue::Null]))
    }

    /// Restricts to instances classified by one of `classes`, including their
    /// sub-classifications.
    pub fn add_where_classification(
        &mut self,
        classes: impl IntoIterator<Item = TypeId>,
    ) -> &mut Self {
        let classes = classes.into_iter().collect();
        self.flush();
        self.compares.push(QPart::ClassEqual(QClassEqual::new(classes)));
        self
    }

    pub fn add_where_attr_in_query(&mut self, attribute: &str, query: AttributeQuery) -> &mut Self {
        self.flush();
        self.compares.push(QPart::In(QIn::new(attribute, query)));
        self
    }

    pub fn add_where_attr_not_in_query(
        &mut self,
        attribute: &str,
        query: AttributeQuery,
    ) -> &mut Self {
        self.flush();
        self.compares
            .push(QPart::In(QIn::new(attribute, query).negated(true)));
        self
    }

    /// Adds a hand-built predicate.
    pub fn add_where(&mut self, part: QPart) -> &mut Self {
        self.flush();
        self.compares.push(part);
        self
    }

    /// An attribute query over the comparisons added so far.
    pub fn attribute_query(&self, attribute: &str) -> AttributeQuery {
        let mut query = AttributeQuery::new(self.ty, attribute).with_where(self.where_part());
        self.configure(query.query_mut());
        query
    }

    /// Builds the query on the first call and returns the same query on
    /// every later call.
    pub fn get_query(&mut self) -> &mut InstanceQuery {
        let query = match self.query.take() {
            Some(query) => query,
            None => {
                let mut query = InstanceQuery::new(self.ty).with_where(self.where_part());
                self.configure(&mut query);
                query
            }
        };

        self.query.insert(query)
    }

    /// Executes the query and returns a print query over its instances.
    pub fn print(&mut self, cx: &mut Context) -> Result<MultiPrintQuery> {
        let query = self.get_query();
        query.execute(cx)?;
        Ok(MultiPrintQuery::from_query(query))
    }

    fn where_part(&self) -> Option<QPart> {
        let mut parts = self.compares.clone();
        if let Some((variant, compare)) = &self.last {
            parts.push(variant(compare.clone()));
        }

        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ if self.or => Some(QPart::Or(parts)),
            _ => Some(QPart::And(parts)),
        }
    }

    fn configure(&self, query: &mut InstanceQuery) {
        if let Some(include) = self.include_child_types {
            query.include_child_types(include);
        }
        query.company_dependent(self.company_dependent);
    }

    fn push_compare(
        &mut self,
        variant: fn(QAttrCompare) -> QPart,
        compare: QAttrCompare,
    ) -> &mut QAttrCompare {
        self.flush();
        &mut self.last.insert((variant, compare)).1
    }

    fn flush(&mut self) {
        if let Some((variant, compare)) = self.last.take() {
            self.compares.push(variant(compare));
        }
    }
}

/// Converts a host value, flattening one level of lists into several
/// values.
fn to_qvalues(attribute: &str, value: Value) -> Result<Vec<QValue>> {
    match value {
        Value::List(items) => items
            .into_iter()
            .map(|item| to_qvalue(attribute, item))
            .collect(),
        value => Ok(vec![to_qvalue(attribute, value)?]),
    }
}

fn to_qvalue(attribute: &str, value: Value) -> Result<QValue> {
    Ok(match value {
        Value::Null => QValue::Null,
        Value::Bool(value) => QValue::Boolean(value),
        value @ (Value::I32(_) | Value::I64(_) | Value::F64(_)) => QValue::Number(value),
        Value::String(value) => QValue::string(value),
        value @ (Value::Date(_) | Value::DateTime(_)) => QValue::DateTime(value),
        Value::Uuid(uuid) => QValue::string(uuid.to_string()),
        Value::Instance(instance) => QValue::Number(Value::I64(instance.id)),
        Value::Type(id) => QValue::Number(Value::I64(id.0)),
        Value::Flag(flag) => QValue::bit(flag),
        value @ (Value::Bytes(_) | Value::List(_)) => {
            return Err(Error::unsupported_value(value.kind_name(), attribute))
        }
    })
}
