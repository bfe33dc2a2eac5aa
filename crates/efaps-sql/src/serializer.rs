#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::{Comma, Period};

mod flavor;
use flavor::Flavor;

mod ident;
use ident::Ident;

mod params;
pub use params::{Bind, Inline, Params, Placeholder};

// Fragment serializers
mod part;
mod select;
mod value;

use efaps_core::{
    driver::{operation::Transaction, Dialect},
    stmt::SqlSelect,
};

/// Serialize a statement to a SQL string
#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    /// The database flavor handles the differences between SQL dialects.
    flavor: Flavor,
}

struct Formatter<'a, T> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

impl Serializer {
    pub fn serialize(&self, stmt: &SqlSelect, params: &mut impl Params) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        stmt.to_sql(&mut fmt);

        ret
    }

    /// Serialize a transaction control operation to a SQL string.
    pub fn serialize_transaction(&self, op: &Transaction) -> String {
        match op {
            Transaction::Start => match self.flavor {
                Flavor::Mysql => "START TRANSACTION".to_string(),
                Flavor::Postgresql | Flavor::Sqlite => "BEGIN".to_string(),
            },
            Transaction::Commit => "COMMIT".to_string(),
            Transaction::Rollback => "ROLLBACK".to_string(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self.flavor {
            Flavor::Sqlite => Dialect::Sqlite,
            Flavor::Postgresql => Dialect::Postgresql,
            Flavor::Mysql => Dialect::Mysql,
        }
    }

    fn is_mysql(&self) -> bool {
        matches!(self.flavor, Flavor::Mysql)
    }
}
