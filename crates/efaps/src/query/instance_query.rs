use super::{StatementRunner, TableIndex};
use crate::{
    db::QueryEnv,
    schema::{ColumnType, TypeId},
    search::{PrepareCx, QPart, QValue},
    Context, Error, Instance, Result, Value,
};

use efaps_core::stmt::SqlSelect;
use efaps_sql::{Inline, Serializer};
use std::vec;
use tracing::debug;

/// Finds the instances of a type matching a predicate tree.
///
/// A query moves from unprepared to prepared to executed. Preparation runs
/// once and injects the type discriminator and company restrictions in
/// front of the user predicate, resolves attributes and builds the
/// statement. Executing again re-runs the prepared statement.
#[derive(Debug, Clone)]
pub struct InstanceQuery {
    base_type: TypeId,
    where_: Option<QPart>,
    include_child_types: Option<bool>,
    company_dependent: bool,
    limit: Option<u64>,
    distinct: bool,

    /// Selects this attribute instead of the instance columns
    select_attribute: Option<String>,

    state: State,
    index: TableIndex,
    select: Option<SqlSelect>,
    ret: Vec<ColumnType>,
    has_type_column: bool,

    instances: Vec<Instance>,
    values: Vec<Value>,
    cursor: Option<vec::IntoIter<Instance>>,
    current: Option<Instance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unprepared,
    Prepared,
    Executed,
}

impl InstanceQuery {
    pub fn new(base_type: impl Into<TypeId>) -> InstanceQuery {
        InstanceQuery {
            base_type: base_type.into(),
            where_: None,
            include_child_types: None,
            company_dependent: true,
            limit: None,
            distinct: false,
            select_attribute: None,
            state: State::Unprepared,
            index: TableIndex::new(),
            select: None,
            ret: vec![],
            has_type_column: false,
            instances: vec![],
            values: vec![],
            cursor: None,
            current: None,
        }
    }

    pub(crate) fn for_attribute(base_type: TypeId, attribute: String) -> InstanceQuery {
        InstanceQuery {
            select_attribute: Some(attribute),
            ..InstanceQuery::new(base_type)
        }
    }

    pub fn with_where(mut self, part: impl Into<Option<QPart>>) -> InstanceQuery {
        self.where_ = part.into();
        self
    }

    pub fn base_type(&self) -> TypeId {
        self.base_type
    }

    /// The predicate tree. After preparation it includes the injected
    /// restrictions.
    pub fn where_part(&self) -> Option<&QPart> {
        self.where_.as_ref()
    }

    /// Whether rows of child types match. Defaults to
    /// [`Config::include_child_types`](crate::Config::include_child_types).
    pub fn include_child_types(&mut self, include: bool) -> &mut Self {
        self.include_child_types = Some(include);
        self
    }

    /// Disables the company restriction of company dependent types when
    /// `false`.
    pub fn company_dependent(&mut self, company_dependent: bool) -> &mut Self {
        self.company_dependent = company_dependent;
        self
    }

    pub fn limit(&mut self, limit: Option<u64>) -> &mut Self {
        self.limit = limit;
        self
    }

    pub fn distinct(&mut self, distinct: bool) -> &mut Self {
        self.distinct = distinct;
        self
    }

    pub fn is_prepared(&self) -> bool {
        self.state != State::Unprepared
    }

    pub fn is_executed(&self) -> bool {
        self.state == State::Executed
    }

    /// The prepared statement.
    pub fn select(&self) -> Option<&SqlSelect> {
        self.select.as_ref()
    }

    pub fn prepare(&mut self, env: QueryEnv<'_>) -> Result<()> {
        if self.state != State::Unprepared {
            return Ok(());
        }

        let schema = env.schema;
        let ty = schema.ty(self.base_type)?;
        let main = schema.table(ty.main_table);

        self.index.seed(main);

        let mut injected = vec![];

        if main.sql_col_type.is_some() {
            let Some(type_attr) = ty.type_attribute() else {
                return Err(Error::invalid_schema(format!(
                    "type `{}` has a type column but no type attribute",
                    ty.name
                )));
            };

            let mut ids = vec![ty.id];
            if self
                .include_child_types
                .unwrap_or(env.config.include_child_types)
            {
                ids.extend(schema.child_types(ty.id));
            }

            debug!(ty = %ty.name, ?ids, "restricting query to type ids");

            let values = ids.iter().map(|id| QValue::Number(Value::I64(id.0))).collect();
            injected.push(QPart::equal(&type_attr.name, values));
        }

        if self.company_dependent && ty.company_dependent {
            let Some(company) = env.session.company else {
                return Err(Error::missing_company(&ty.name));
            };

            let Some(company_attr) = ty.company_attribute() else {
                return Err(Error::missing_company(&ty.name));
            };

            debug!(ty = %ty.name, company, "restricting query to company");
            injected.push(QPart::equal(
                &company_attr.name,
                vec![QValue::Number(Value::I64(company))],
            ));
        }

        // The user tree stays untouched until preparation succeeds
        let mut where_ = self.where_.clone();
        if !injected.is_empty() {
            injected.extend(where_);
            where_ = Some(QPart::And(injected));
        }

        if let Some(part) = &mut where_ {
            part.prepare(&mut PrepareCx {
                env,
                ty,
                index: &mut self.index,
            })?;
        }

        let mut select = SqlSelect::new().distinct(self.distinct);
        self.ret.clear();

        match &self.select_attribute {
            Some(name) => {
                let attr = ty.attribute(name)?;
                let index = self.index.index_of(schema.table(attr.table));
                select = select.column(index, attr.sql_col_name());
                self.ret.push(attr.column_type());
            }
            None => {
                select = select.column(0, &main.sql_col_id);
                self.ret.push(ColumnType::Integer);

                if let Some(column) = &main.sql_col_type {
                    select = select.column(0, column);
                    self.ret.push(ColumnType::Integer);
                }
            }
        }
        self.has_type_column = self.select_attribute.is_none() && main.sql_col_type.is_some();

        select = select.from(&main.name, 0);
        for (table_id, index) in self.index.joined() {
            let table = schema.table(table_id);
            select = select.left_join(&table.name, index, &table.sql_col_id, 0, &main.sql_col_id);
        }
        select = select.limit(self.limit);

        if let Some(part) = &where_ {
            part.append_sql(&mut select)?;
        }

        self.where_ = where_;
        self.select = Some(select);
        self.state = State::Prepared;
        Ok(())
    }

    /// Statement text as sent to the database, with placeholders.
    pub fn sql(&mut self, cx: &Context) -> Result<String> {
        self.render(cx, &mut Vec::<Value>::new())
    }

    /// Statement text with values inlined as literals. For diagnostics only.
    pub fn inline_sql(&mut self, cx: &Context) -> Result<String> {
        self.render(cx, &mut Inline)
    }

    fn render(&mut self, cx: &Context, params: &mut impl efaps_sql::Params) -> Result<String> {
        self.prepare(cx.env())?;
        let select = self.prepared_select()?;
        Ok(Serializer::for_dialect(cx.dialect()).serialize(select, params))
    }

    /// Runs the query and returns the matching instances the session may
    /// access.
    pub fn execute(&mut self, cx: &mut Context) -> Result<Vec<Instance>> {
        self.run(cx, true)
    }

    pub fn execute_without_access_check(&mut self, cx: &mut Context) -> Result<Vec<Instance>> {
        self.run(cx, false)
    }

    /// Runs an attribute query and returns the selected values.
    pub(crate) fn execute_values(&mut self, cx: &mut Context) -> Result<Vec<Value>> {
        self.run(cx, false)?;
        Ok(self.values.clone())
    }

    fn run(&mut self, cx: &mut Context, check_access: bool) -> Result<Vec<Instance>> {
        self.prepare(cx.env())?;
        let select = self.prepared_select()?.clone();

        let ret = self.ret.clone();
        let mut runner = StatementRunner::new(cx);
        let mut instances = vec![];
        let mut values = vec![];

        if self.select_attribute.is_some() {
            runner.execute(select, ret, |row| {
                values.push(row.into_iter().next().unwrap_or_default());
                Ok(())
            })?;
        } else {
            runner.execute(select, ret, |row| {
                instances.push(self.instance(&row)?);
                Ok(())
            })?;

            if check_access {
                instances = runner.or_abort(move |cx| cx.filter_access(instances))?;
            }
        }

        self.instances = instances;
        self.values = values;
        self.cursor = None;
        self.current = None;

        self.state = State::Executed;
        Ok(self.instances.clone())
    }

    fn instance(&self, row: &[Value]) -> Result<Instance> {
        let Some(id) = row.first().and_then(Value::as_i64) else {
            return Err(Error::invalid_result("id column is not an integer"));
        };

        let ty = match row.get(1) {
            Some(value) if self.has_type_column => value.as_i64().map(TypeId),
            _ => None,
        };

        Ok(Instance::new(ty.unwrap_or(self.base_type), id))
    }

    fn prepared_select(&self) -> Result<&SqlSelect> {
        self.select
            .as_ref()
            .ok_or_else(|| Error::invalid_statement("query is not prepared"))
    }

    /// Instances found by the last execution.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Values found by the last execution of an attribute query.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Advances the cursor. The first call takes a snapshot of the
    /// instances; executing the query again resets the cursor.
    pub fn next(&mut self) -> bool {
        let instances = &self.instances;
        let cursor = self
            .cursor
            .get_or_insert_with(|| instances.clone().into_iter());

        self.current = cursor.next();
        self.current.is_some()
    }

    pub fn current_instance(&self) -> Option<Instance> {
        self.current
    }
}
