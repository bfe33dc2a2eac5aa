use crate::{
    driver::operation::QuerySql,
    schema::ColumnType,
    Context, Result, Value,
};

use efaps_core::stmt::{RowSet, SqlSelect};
use efaps_sql::Serializer;
use tracing::{debug, warn};

/// Runs statements on the connection resource of a [`Context`].
///
/// Every statement gets the deadline of the resource. Any failure aborts the
/// resource before the error is returned, leaving retry policy to the
/// caller.
#[derive(Debug)]
pub struct StatementRunner<'a> {
    cx: &'a mut Context,
}

impl<'a> StatementRunner<'a> {
    pub fn new(cx: &'a mut Context) -> StatementRunner<'a> {
        StatementRunner { cx }
    }

    /// Executes `select` and returns all rows, each column read as the
    /// matching entry of `ret`.
    pub fn fetch(&mut self, select: SqlSelect, ret: Vec<ColumnType>) -> Result<RowSet> {
        let serializer = Serializer::for_dialect(self.cx.dialect());
        let mut params = vec![];
        let sql = serializer.serialize(&select, &mut params);

        match run(self.cx, QuerySql::new(select, ret)) {
            Ok(rows) => {
                debug!(%sql, params = params.len(), rows = rows.len(), "executed statement");
                Ok(rows)
            }
            Err(err) => {
                debug!(%sql, params = params.len(), %err, "statement failed");
                self.abort();
                Err(err)
            }
        }
    }

    /// Executes `select` and hands every row to `on_row`, in order.
    ///
    /// Returns the number of rows processed. An error from `on_row` stops
    /// processing and aborts the resource like a failed statement.
    pub fn execute(
        &mut self,
        select: SqlSelect,
        ret: Vec<ColumnType>,
        mut on_row: impl FnMut(Vec<Value>) -> Result<()>,
    ) -> Result<usize> {
        let rows = self.fetch(select, ret)?;
        let count = rows.len();

        for row in rows {
            if let Err(err) = on_row(row) {
                self.abort();
                return Err(err);
            }
        }

        Ok(count)
    }

    /// Runs follow-up work on the context, aborting the resource if it
    /// fails.
    pub fn or_abort<T>(&mut self, f: impl FnOnce(&mut Context) -> Result<T>) -> Result<T> {
        let ret = f(&mut *self.cx);
        if ret.is_err() {
            self.abort();
        }
        ret
    }

    fn abort(&mut self) {
        if let Err(err) = self.cx.abort() {
            warn!(%err, "aborting connection resource failed");
        }
    }
}

fn run(cx: &mut Context, op: QuerySql) -> Result<RowSet> {
    let resource = cx.connection_resource()?;
    let deadline = resource.deadline();
    resource.exec(op.deadline(deadline))?.rows.into_values()
}
