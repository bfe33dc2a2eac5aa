mod query_sql;
pub use query_sql::QuerySql;

mod transaction;
pub use transaction::Transaction;

#[derive(Debug)]
pub enum Operation {
    /// Execute a SQL query
    QuerySql(QuerySql),

    /// Execute a transaction lifecycle op
    Transaction(Transaction),

    /// Load the columns of the named table
    TableInformation(String),
}
