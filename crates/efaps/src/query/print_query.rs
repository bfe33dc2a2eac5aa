use super::{
    selection::Slot,
    value_select::Source,
    CachedResult, InstanceQuery, SelectStep, Selection, StatementRunner, TableIndex, ValueSelect,
};
use crate::{
    schema::{ColumnType, TableId, Type, TypeId},
    Context, Error, Instance, Result, Schema, Value,
};

use efaps_core::stmt::{RowSet, SqlPart, SqlSelect};
use indexmap::{IndexMap, IndexSet};

/// Bound parameters kept free for the non-id part of a print statement.
const RESERVED_PARAMS: usize = 8;

/// Reads values of a known set of instances.
///
/// Selects are grouped by the table holding their columns; each group is
/// read with one statement per batch of ids, `where T0.ID in (...)`. A single
/// group streams rows straight into the [`Selection`]; several groups are
/// correlated by id through a [`CachedResult`]. `linkfrom` selects run a
/// statement of their own and yield a list per instance.
#[derive(Debug)]
pub struct MultiPrintQuery {
    base_type: TypeId,
    instances: Vec<Instance>,
    selects: Vec<ValueSelect>,
    selection: Option<Selection>,
    position: Option<usize>,
}

/// A statement reading the columns of several selects.
struct Statement {
    select: SqlSelect,
    ret: Vec<ColumnType>,
    slots: Vec<Slot>,
}

impl MultiPrintQuery {
    pub fn new(base_type: impl Into<TypeId>, instances: Vec<Instance>) -> MultiPrintQuery {
        MultiPrintQuery {
            base_type: base_type.into(),
            instances,
            selects: vec![],
            selection: None,
            position: None,
        }
    }

    /// A print query over the instances found by an executed query.
    pub fn from_query(query: &InstanceQuery) -> MultiPrintQuery {
        MultiPrintQuery::new(query.base_type(), query.instances().to_vec())
    }

    pub fn add_attribute(&mut self, name: &str) -> &mut Self {
        self.push(ValueSelect::attribute(name));
        self
    }

    /// Adds a select expression, for example `attribute[Date].format[%Y]`,
    /// `type.label` or `linkfrom[Position#Invoice].attribute[Quantity]`.
    pub fn add_select(&mut self, expr: &str) -> Result<&mut Self> {
        self.push(ValueSelect::parse(expr)?);
        Ok(self)
    }

    fn push(&mut self, select: ValueSelect) {
        if !self.selects.contains(&select) {
            self.selects.push(select);
        }
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Reads the values of the instances the session may access. Returns
    /// `false` if no instance is left.
    pub fn execute(&mut self, cx: &mut Context) -> Result<bool> {
        self.run(cx, true)
    }

    pub fn execute_without_access_check(&mut self, cx: &mut Context) -> Result<bool> {
        self.run(cx, false)
    }

    fn run(&mut self, cx: &mut Context, check_access: bool) -> Result<bool> {
        StatementRunner::new(cx).or_abort(|cx| self.read(cx, check_access))
    }

    fn read(&mut self, cx: &mut Context, check_access: bool) -> Result<bool> {
        if check_access {
            self.instances = cx.filter_access(std::mem::take(&mut self.instances))?;
        }

        self.position = None;

        let db = cx.db().clone();
        let schema = db.schema();
        let ty = schema.ty(self.base_type)?;

        let mut selection = Selection::new(self.selects.clone(), self.instances.clone());

        if !self.instances.is_empty() {
            let ids = distinct_ids(&self.instances);
            let batch = cx
                .config()
                .print_batch_size
                .min(db.capability().max_params.saturating_sub(RESERVED_PARAMS))
                .max(1);

            let mut groups = IndexMap::<TableId, Vec<usize>>::new();
            groups.insert(ty.main_table, vec![]);
            let mut derived = vec![];
            let mut link_froms = vec![];

            for (i, select) in self.selects.iter().enumerate() {
                match select.source(schema, ty)? {
                    Source::Table(table) => groups.entry(table).or_default().push(i),
                    Source::Instance => derived.push(i),
                    Source::LinkFrom => link_froms.push(i),
                }
            }
            groups.retain(|_, selects| !selects.is_empty());

            if groups.len() == 1 {
                if let Some((table, selects)) = groups.first() {
                    let stmt = self.statement(schema, ty, *table, selects, 1)?;
                    for chunk in ids.chunks(batch) {
                        StatementRunner::new(cx).execute(
                            with_ids(&stmt.select, schema, *table, chunk),
                            stmt.ret.clone(),
                            |row| selection.add_row(schema, ty, &row, &stmt.slots),
                        )?;
                    }
                }
            } else if groups.len() > 1 {
                self.read_groups(cx, schema, ty, &groups, &ids, batch, &mut selection)?;
            }

            for i in derived {
                selection.fill(schema, ty, i)?;
            }

            for i in link_froms {
                self.read_link_from(cx, schema, i, &ids, batch, &mut selection)?;
            }
        }

        self.selection = Some(selection);
        Ok(!self.instances.is_empty())
    }

    #[allow(clippy::too_many_arguments)]
    fn read_groups(
        &self,
        cx: &mut Context,
        schema: &Schema,
        ty: &Type,
        groups: &IndexMap<TableId, Vec<usize>>,
        ids: &[i64],
        batch: usize,
        selection: &mut Selection,
    ) -> Result<()> {
        let mut cached = CachedResult::new();
        let mut slots = vec![];
        let mut offset = 1;

        for (table, selects) in groups {
            let stmt = self.statement(schema, ty, *table, selects, offset)?;
            offset += stmt.ret.len() - 1;

            let mut rows = RowSet::new(stmt.ret.len());
            for chunk in ids.chunks(batch) {
                let fetched = StatementRunner::new(cx)
                    .fetch(with_ids(&stmt.select, schema, *table, chunk), stmt.ret.clone())?;
                rows.rows.extend(fetched.rows);
            }

            let first = cached.is_empty();
            cached.populate(rows, 0, None)?;
            slots.extend(stmt.slots);

            if first && cached.is_empty() {
                // None of the instances has a row to merge into
                return Ok(());
            }
        }

        cached.before_first();
        while cached.next() {
            if let Some(row) = cached.current() {
                selection.add_row(schema, ty, row, &slots)?;
            }
        }

        Ok(())
    }

    fn read_link_from(
        &self,
        cx: &mut Context,
        schema: &Schema,
        select_index: usize,
        ids: &[i64],
        batch: usize,
        selection: &mut Selection,
    ) -> Result<()> {
        let select = &self.selects[select_index];
        let Some(SelectStep::LinkFrom { ty, attribute }) = select.steps().first() else {
            return Ok(());
        };

        let link_ty = schema.type_by_name(ty)?;
        let link = link_ty.attribute(attribute)?;
        if !link.is_link() {
            return Err(Error::invalid_statement(format!(
                "`{}`: attribute `{}` of `{}` is not a link",
                select.expr(),
                attribute,
                link_ty.name
            )));
        }

        let tail = select.tail();
        let link_table = schema.table(link.table);

        let mut index = TableIndex::new();
        index.seed(link_table);

        let mut stmt = SqlSelect::new()
            .column(0, link.sql_col_name())
            .column(0, &link_table.sql_col_id);
        let mut ret = vec![ColumnType::Integer, ColumnType::Integer];

        let table_index = match tail.source(schema, link_ty)? {
            Source::Table(table) => index.index_of(schema.table(table)),
            _ => 0,
        };
        tail.append(schema, link_ty, &mut stmt, &mut ret, table_index)?;

        stmt = stmt.from(&link_table.name, 0);
        for (table, index) in index.joined() {
            let table = schema.table(table);
            stmt = stmt.left_join(&table.name, index, &table.sql_col_id, 0, &link_table.sql_col_id);
        }

        let type_filter = match &link_table.sql_col_type {
            Some(column) if link_table.id == link_ty.main_table => {
                let ids = std::iter::once(link_ty.id)
                    .chain(schema.child_types(link_ty.id))
                    .map(|id| Value::I64(id.0))
                    .collect();
                Some((column.clone(), Value::List(ids)))
            }
            _ => None,
        };

        let mut rows = RowSet::new(ret.len());
        for chunk in ids.chunks(batch) {
            let mut chunk_stmt = stmt.clone();
            chunk_stmt
                .push_column(0, link.sql_col_name())
                .push(SqlPart::In)
                .push_value(id_list(chunk));

            if let Some((column, ids)) = &type_filter {
                chunk_stmt
                    .push(SqlPart::And)
                    .push_column(0, column)
                    .push(SqlPart::In)
                    .push_value(ids.clone());
            }

            let fetched = StatementRunner::new(cx).fetch(chunk_stmt, ret.clone())?;
            rows.rows.extend(fetched.rows);
        }

        let mut cached = CachedResult::new();
        cached.populate(rows, 0, Some(1))?;

        for (position, instance) in selection.instances().to_vec().into_iter().enumerate() {
            let values = cached
                .rows_for(instance.id)
                .iter()
                .map(|row| {
                    let id = row.get(1).and_then(Value::as_i64).unwrap_or_default();
                    let linked = Instance::new(link_ty.id, id);
                    tail.value(schema, link_ty, linked, row.get(2..).unwrap_or_default())
                })
                .collect::<Result<Vec<_>>>()?;

            selection.set(position, select_index, Value::List(values));
        }

        Ok(())
    }

    /// Builds the statement reading `selects` from `table`. Their values land
    /// at `offset` onwards once the id column is stripped.
    fn statement(
        &self,
        schema: &Schema,
        ty: &Type,
        table: TableId,
        selects: &[usize],
        offset: usize,
    ) -> Result<Statement> {
        let table = schema.table(table);
        let mut select = SqlSelect::new()
            .column(0, &table.sql_col_id)
            .from(&table.name, 0);
        let mut ret = vec![ColumnType::Integer];
        let mut slots = vec![];

        for &i in selects {
            let start = select.column_count();
            let width = self.selects[i].append(schema, ty, &mut select, &mut ret, 0)?;
            slots.push(Slot {
                select: i,
                offset: offset + start - 1,
                width,
            });
        }

        Ok(Statement { select, ret, slots })
    }

    /// Advances to the next instance.
    pub fn next(&mut self) -> bool {
        let len = self.selection.as_ref().map(Selection::len).unwrap_or(0);
        let next = self.position.map(|position| position + 1).unwrap_or(0);

        if next < len {
            self.position = Some(next);
            true
        } else {
            self.position = Some(len);
            false
        }
    }

    pub fn current_instance(&self) -> Option<Instance> {
        let position = self.position?;
        self.selection.as_ref()?.instances().get(position).copied()
    }

    /// Value of `attribute[name]` for the current instance.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.select(&format!("attribute[{name}]"))
    }

    /// Value of a select expression for the current instance.
    pub fn select(&self, expr: &str) -> Option<&Value> {
        let position = self.position?;
        let selection = self.selection.as_ref()?;
        let index = self.selects.iter().position(|select| select.expr() == expr)?;
        selection.get(position, index)
    }
}

fn distinct_ids(instances: &[Instance]) -> Vec<i64> {
    instances
        .iter()
        .map(|instance| instance.id)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

fn id_list(ids: &[i64]) -> Value {
    Value::List(ids.iter().copied().map(Value::I64).collect())
}

/// `select` restricted to the rows of `ids`.
fn with_ids(select: &SqlSelect, schema: &Schema, table: TableId, ids: &[i64]) -> SqlSelect {
    let mut ret = select.clone();
    ret.push_column(0, &schema.table(table).sql_col_id)
        .push(SqlPart::In)
        .push_value(id_list(ids));
    ret
}
