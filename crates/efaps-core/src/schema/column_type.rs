/// Storage type of a column as the query core reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Real,
    String,
    Boolean,
    Date,
    DateTime,
    Bytes,
}

impl ColumnType {
    pub fn is_integer(self) -> bool {
        matches!(self, ColumnType::Integer)
    }
}
