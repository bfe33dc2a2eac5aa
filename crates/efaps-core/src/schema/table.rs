/// A physical SQL table.
#[derive(Debug, Clone)]
pub struct SqlTable {
    /// Uniquely identifies the table
    pub id: TableId,

    /// Name of the table in the database
    pub name: String,

    /// Name of the id column
    pub sql_col_id: String,

    /// Discriminator column, set when several types share the table
    pub sql_col_type: Option<String>,

    /// The table owning the id sequence. Set for tables that only hold
    /// supplementary columns of a type.
    pub main_table: Option<TableId>,
}

/// Uniquely identifies a table
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct TableId(pub i64);

impl SqlTable {
    pub fn new(id: impl Into<TableId>, name: impl Into<String>) -> SqlTable {
        SqlTable {
            id: id.into(),
            name: name.into(),
            sql_col_id: "ID".to_string(),
            sql_col_type: None,
            main_table: None,
        }
    }

    pub fn sql_col_id(mut self, column: impl Into<String>) -> SqlTable {
        self.sql_col_id = column.into();
        self
    }

    pub fn sql_col_type(mut self, column: impl Into<String>) -> SqlTable {
        self.sql_col_type = Some(column.into());
        self
    }

    pub fn main_table(mut self, table: impl Into<TableId>) -> SqlTable {
        self.main_table = Some(table.into());
        self
    }
}

impl From<i64> for TableId {
    fn from(value: i64) -> TableId {
        TableId(value)
    }
}
