use super::{ConnectionResource, Db};
use crate::{
    driver::{operation::Operation, Dialect, TableInformation},
    Config, Error, Instance, Result, Schema,
};

use indexmap::IndexMap;

/// The user-facing state a unit of work runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Company the session acts for. Required by company dependent types.
    pub company: Option<i64>,

    /// Locale used to case-fold values of case-insensitive comparisons
    pub locale: String,
}

impl Session {
    pub fn new(locale: impl Into<String>) -> Session {
        Session {
            company: None,
            locale: locale.into(),
        }
    }

    pub fn company(mut self, company: i64) -> Session {
        self.company = Some(company);
        self
    }
}

/// Read-only view of the context used while preparing queries.
#[derive(Debug, Clone, Copy)]
pub struct QueryEnv<'a> {
    pub schema: &'a Schema,
    pub session: &'a Session,
    pub config: &'a Config,
    pub dialect: Dialect,
}

/// One unit of work.
///
/// A context owns at most one [`ConnectionResource`], opened the first time a
/// statement runs. All statements of the unit of work share it until
/// [`commit`](Context::commit) or [`abort`](Context::abort). Dropping the
/// context with an open resource rolls the transaction back.
#[derive(Debug)]
pub struct Context {
    db: Db,
    session: Session,
    resource: Option<ConnectionResource>,
}

impl Context {
    pub(crate) fn new(db: Db, session: Session) -> Context {
        Context {
            db,
            session,
            resource: None,
        }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn schema(&self) -> &Schema {
        self.db.schema()
    }

    pub fn config(&self) -> &Config {
        self.db.config()
    }

    pub fn dialect(&self) -> Dialect {
        self.db.capability().dialect
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn company(&self) -> Option<i64> {
        self.session.company
    }

    pub fn set_company(&mut self, company: Option<i64>) {
        self.session.company = company;
    }

    pub fn locale(&self) -> &str {
        &self.session.locale
    }

    pub fn env(&self) -> QueryEnv<'_> {
        QueryEnv {
            schema: self.db.schema(),
            session: &self.session,
            config: self.db.config(),
            dialect: self.dialect(),
        }
    }

    /// Returns the open connection resource, opening one if needed.
    pub fn connection_resource(&mut self) -> Result<&mut ConnectionResource> {
        let reopen = !matches!(&self.resource, Some(resource) if resource.is_opened());

        if reopen {
            self.resource = Some(ConnectionResource::open(self.db.pool(), self.db.config())?);
        }

        match &mut self.resource {
            Some(resource) => Ok(resource),
            None => Err(Error::connection_pool("connection resource unavailable")),
        }
    }

    /// Returns `true` if a transaction is running.
    pub fn is_opened(&self) -> bool {
        self.resource
            .as_ref()
            .is_some_and(ConnectionResource::is_opened)
    }

    /// Commits the running transaction, if any.
    pub fn commit(&mut self) -> Result<()> {
        match self.resource.take() {
            Some(mut resource) => resource.commit(),
            None => Ok(()),
        }
    }

    /// Rolls back the running transaction, if any.
    pub fn abort(&mut self) -> Result<()> {
        match self.resource.take() {
            Some(mut resource) => resource.abort(),
            None => Ok(()),
        }
    }

    /// Loads the physical columns of `table` from the database catalog.
    pub fn table_information(&mut self, table: &str) -> Result<TableInformation> {
        self.connection_resource()?
            .exec(Operation::TableInformation(table.to_string()))?
            .rows
            .into_information()
    }

    /// Checks that every column the schema maps an attribute to exists.
    pub fn verify_tables(&mut self) -> Result<()> {
        let db = self.db.clone();
        let schema = db.schema();
        let mut loaded = IndexMap::new();

        for table in schema.tables() {
            let info = self.table_information(&table.name)?;

            if info.column(&table.sql_col_id).is_none() {
                return Err(missing_column(&table.name, &table.sql_col_id, "id column"));
            }

            if let Some(column) = &table.sql_col_type {
                if info.column(column).is_none() {
                    return Err(missing_column(&table.name, column, "type column"));
                }
            }

            loaded.insert(table.id, info);
        }

        for ty in schema.types() {
            for attr in ty.attributes.values() {
                let table = schema.table(attr.table);
                let Some(info) = loaded.get(&attr.table) else {
                    continue;
                };

                for column in &attr.sql_col_names {
                    if info.column(column).is_none() {
                        let what = format!("column of attribute `{}.{}`", ty.name, attr.name);
                        return Err(missing_column(&table.name, column, &what));
                    }
                }
            }
        }

        Ok(())
    }

    /// Passes `instances` through the access check of the `Db`.
    pub fn filter_access(&self, instances: Vec<Instance>) -> Result<Vec<Instance>> {
        self.db
            .access_check()
            .filter(self.db.schema(), &self.session, instances)
    }
}

fn missing_column(table: &str, column: &str, what: &str) -> Error {
    Error::invalid_schema(format!(
        "{what} `{column}` does not exist in table `{table}`"
    ))
}
