use super::Error;

/// Error when the database declares a column type the dialect cannot map to a
/// [`ColumnType`](crate::schema::ColumnType).
///
/// Raised while loading table information, never while a query runs.
#[derive(Debug)]
pub(super) struct UnknownColumnType {
    table: Box<str>,
    column: Box<str>,
    decl: Box<str>,
}

impl std::error::Error for UnknownColumnType {}

impl core::fmt::Display for UnknownColumnType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "unknown column type `{}` for {}.{}",
            self.decl, self.table, self.column
        )
    }
}

impl Error {
    /// Creates an unknown column type error.
    pub fn unknown_column_type(
        table: impl Into<String>,
        column: impl Into<String>,
        decl: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::UnknownColumnType(UnknownColumnType {
            table: table.into().into(),
            column: column.into().into(),
            decl: decl.into().into(),
        }))
    }

    /// Returns `true` if this error is an unknown column type error.
    pub fn is_unknown_column_type(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnknownColumnType(_))
    }
}
