use super::Value;

/// Rows returned by a query, each holding one value per selected column.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RowSet {
    /// Number of columns per row
    pub width: usize,

    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(width: usize) -> RowSet {
        RowSet {
            width,
            rows: vec![],
        }
    }

    pub fn push(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.width, "row width mismatch");
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vec<Value>> {
        self.rows.iter()
    }
}

impl IntoIterator for RowSet {
    type Item = Vec<Value>;
    type IntoIter = std::vec::IntoIter<Vec<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
