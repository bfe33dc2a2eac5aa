use crate::schema::ColumnType;

use indexmap::IndexMap;

/// Physical columns of a table as reported by the database catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInformation {
    pub name: String,

    /// Columns keyed by upper-cased name
    pub columns: IndexMap<String, ColumnInformation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInformation {
    pub name: String,
    pub ty: ColumnType,
    pub nullable: bool,
}

impl TableInformation {
    pub fn new(name: impl Into<String>) -> TableInformation {
        TableInformation {
            name: name.into(),
            columns: IndexMap::new(),
        }
    }

    pub fn push(&mut self, column: ColumnInformation) {
        self.columns
            .insert(column.name.to_ascii_uppercase(), column);
    }

    /// Looks up a column, ignoring case.
    pub fn column(&self, name: &str) -> Option<&ColumnInformation> {
        self.columns.get(&name.to_ascii_uppercase())
    }
}
