mod value;
pub(crate) use value::Value;

use efaps_core::{
    driver::{
        operation::{Operation, QuerySql},
        Capability, ColumnInformation, Driver, Response, TableInformation,
    },
    stmt::RowSet,
    Error, Result,
};
use efaps_sql::Serializer;
use rusqlite::Connection as RusqliteConnection;
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use url::Url;

/// Number of SQLite virtual machine instructions between deadline checks.
const PROGRESS_INTERVAL: i32 = 1_000;

#[derive(Debug)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver with an arbitrary connection URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::driver_operation_failed)?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `sqlite` scheme; url={}",
                url_str
            )));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

impl Driver for Sqlite {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    fn connect(&self) -> Result<Box<dyn efaps_core::Connection>> {
        let connection = match self {
            Sqlite::File(path) => Connection::open(path)?,
            Sqlite::InMemory => Connection::in_memory()?,
        };
        Ok(Box::new(connection))
    }

    fn max_connections(&self) -> Option<usize> {
        // Every in-memory connection is a database of its own
        matches!(self, Self::InMemory).then_some(1)
    }
}

#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection =
            RusqliteConnection::open_in_memory().map_err(Error::driver_operation_failed)?;

        Ok(Self { connection })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(Error::driver_operation_failed)?;
        Ok(Self { connection })
    }

    fn query(&mut self, op: QuerySql) -> Result<Response> {
        let mut params: Vec<efaps_core::stmt::Value> = vec![];
        let sql = Serializer::sqlite().serialize(&op.stmt, &mut params);

        let start = Instant::now();
        if let Some(deadline) = op.deadline {
            if deadline <= start {
                return Err(Error::statement_timed_out(Some(sql), Duration::ZERO));
            }

            self.connection
                .progress_handler(PROGRESS_INTERVAL, Some(move || Instant::now() >= deadline));
        }

        tracing::trace!(%sql, params = params.len(), "sqlite query");

        let ret = self.query_rows(&sql, &params, &op.ret);

        if op.deadline.is_some() {
            self.connection
                .progress_handler(0, None::<fn() -> bool>);
        }

        match ret {
            Ok(rows) => Ok(Response::row_set(rows)),
            Err(QueryError::Sqlite(err))
                if err.sqlite_error_code() == Some(rusqlite::ErrorCode::OperationInterrupted) =>
            {
                Err(Error::statement_timed_out(Some(sql), start.elapsed()))
            }
            Err(QueryError::Sqlite(err)) => Err(Error::statement_failed(sql, err)),
            Err(QueryError::Decode(err)) => Err(err),
        }
    }

    fn query_rows(
        &self,
        sql: &str,
        params: &[efaps_core::stmt::Value],
        ret: &[efaps_core::schema::ColumnType],
    ) -> std::result::Result<RowSet, QueryError> {
        let mut stmt = self.connection.prepare_cached(sql)?;

        let width = stmt.column_count();
        if width < ret.len() {
            return Err(QueryError::Decode(Error::invalid_result(format!(
                "statement returns {width} columns, {} expected",
                ret.len()
            ))));
        }

        let params = params.iter().cloned().map(Value::from).collect::<Vec<_>>();
        let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;

        let mut ret_rows = RowSet::new(ret.len());

        while let Some(row) = rows.next()? {
            let mut items = Vec::with_capacity(ret.len());

            for (index, ty) in ret.iter().enumerate() {
                let value = Value::from_sql(row, index, *ty).map_err(QueryError::Decode)?;
                items.push(value.into_inner());
            }

            ret_rows.push(items);
        }

        Ok(ret_rows)
    }

    fn table_information(&self, table: &str) -> Result<TableInformation> {
        let dialect = Capability::SQLITE.dialect;

        let mut stmt = self
            .connection
            .prepare("select name, type, \"notnull\" from pragma_table_info(?1)")
            .map_err(Error::driver_operation_failed)?;

        let columns = stmt
            .query_map([table], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(Error::driver_operation_failed)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::driver_operation_failed)?;

        if columns.is_empty() {
            return Err(Error::invalid_schema(format!("table `{table}` does not exist")));
        }

        let mut info = TableInformation::new(table);

        for (name, decl, not_null) in columns {
            let Some(ty) = dialect.read_column_type(&decl) else {
                return Err(Error::unknown_column_type(table, name, decl));
            };

            info.push(ColumnInformation {
                name,
                ty,
                nullable: not_null == 0,
            });
        }

        Ok(info)
    }
}

impl efaps_core::driver::Connection for Connection {
    fn exec(&mut self, op: Operation) -> Result<Response> {
        match op {
            Operation::QuerySql(op) => self.query(op),
            Operation::Transaction(op) => {
                let sql = Serializer::sqlite().serialize_transaction(&op);
                self.connection
                    .execute_batch(&sql)
                    .map_err(Error::driver_operation_failed)?;
                Ok(Response::count(0))
            }
            Operation::TableInformation(table) => {
                self.table_information(&table).map(Response::information)
            }
        }
    }
}

/// Failure while running a query, before it is attributed to the statement.
enum QueryError {
    Sqlite(rusqlite::Error),
    Decode(Error),
}

impl From<rusqlite::Error> for QueryError {
    fn from(err: rusqlite::Error) -> QueryError {
        QueryError::Sqlite(err)
    }
}
