use super::Operation;

use crate::{schema::ColumnType, stmt};

use std::time::Instant;

#[derive(Debug, Clone)]
pub struct QuerySql {
    /// The SQL query to execute
    pub stmt: stmt::SqlSelect,

    /// How to read each selected column
    pub ret: Vec<ColumnType>,

    /// The statement is interrupted once this instant passes
    pub deadline: Option<Instant>,
}

impl QuerySql {
    pub fn new(stmt: stmt::SqlSelect, ret: Vec<ColumnType>) -> QuerySql {
        QuerySql {
            stmt,
            ret,
            deadline: None,
        }
    }

    pub fn deadline(mut self, deadline: Option<Instant>) -> QuerySql {
        self.deadline = deadline;
        self
    }
}

impl From<QuerySql> for Operation {
    fn from(value: QuerySql) -> Self {
        Self::QuerySql(value)
    }
}
