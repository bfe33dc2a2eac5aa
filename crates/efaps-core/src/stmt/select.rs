use super::{SqlPart, Value};

/// Structure of a `select` statement, rendered to text by a dialect aware
/// serializer.
///
/// Tables are aliased `T{index}` and columns refer to them through the same
/// index. Left joins render in insertion order after the first plain table.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SqlSelect {
    pub distinct: bool,
    pub columns: Vec<SelectColumn>,
    pub from: Vec<FromTable>,
    pub filter: Vec<SqlPart>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub table_index: Option<usize>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FromTable {
    /// A table in the `from` list
    Table { name: String, index: Option<usize> },

    /// `left join {name} T{index} on T{join_index}.{join_column}=T{index}.{column}`
    LeftJoin {
        name: String,
        index: usize,
        column: String,
        join_index: usize,
        join_column: String,
    },
}

impl SqlSelect {
    pub fn new() -> SqlSelect {
        SqlSelect::default()
    }

    pub fn distinct(mut self, distinct: bool) -> SqlSelect {
        self.distinct = distinct;
        self
    }

    /// Adds a column qualified by the alias of table `index`.
    pub fn column(mut self, index: usize, name: impl Into<String>) -> SqlSelect {
        self.columns.push(SelectColumn {
            table_index: Some(index),
            name: name.into(),
        });
        self
    }

    pub fn column_unqualified(mut self, name: impl Into<String>) -> SqlSelect {
        self.columns.push(SelectColumn {
            table_index: None,
            name: name.into(),
        });
        self
    }

    pub fn from(mut self, name: impl Into<String>, index: usize) -> SqlSelect {
        self.from.push(FromTable::Table {
            name: name.into(),
            index: Some(index),
        });
        self
    }

    pub fn from_unaliased(mut self, name: impl Into<String>) -> SqlSelect {
        self.from.push(FromTable::Table {
            name: name.into(),
            index: None,
        });
        self
    }

    pub fn left_join(
        mut self,
        name: impl Into<String>,
        index: usize,
        column: impl Into<String>,
        join_index: usize,
        join_column: impl Into<String>,
    ) -> SqlSelect {
        self.from.push(FromTable::LeftJoin {
            name: name.into(),
            index,
            column: column.into(),
            join_index,
            join_column: join_column.into(),
        });
        self
    }

    pub fn limit(mut self, limit: Option<u64>) -> SqlSelect {
        self.limit = limit;
        self
    }

    pub fn push(&mut self, part: SqlPart) -> &mut SqlSelect {
        self.filter.push(part);
        self
    }

    pub fn push_value(&mut self, value: impl Into<Value>) -> &mut SqlSelect {
        self.filter.push(SqlPart::Value(value.into()));
        self
    }

    pub fn push_column(&mut self, table_index: usize, name: impl Into<String>) -> &mut SqlSelect {
        self.filter.push(SqlPart::column(table_index, name));
        self
    }

    pub fn has_filter(&self) -> bool {
        !self.filter.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Values of the filter in rendering order, including nested selects.
    pub fn values(&self) -> Vec<&Value> {
        let mut ret = vec![];
        self.collect_values(&mut ret);
        ret
    }

    fn collect_values<'a>(&'a self, dst: &mut Vec<&'a Value>) {
        for part in &self.filter {
            match part {
                SqlPart::Value(value) => dst.push(value),
                SqlPart::SubSelect(select) => select.collect_values(dst),
                _ => {}
            }
        }
    }
}
