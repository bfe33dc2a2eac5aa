use super::Error;

/// Error when the metadata model is inconsistent.
///
/// This occurs when:
/// - A type or attribute references a table that was never registered
/// - A type's supplementary table does not point back to the type's main table
/// - A company dependent type has no company attribute
/// - An attribute column does not exist in the physical table
///
/// These errors are caught while building the schema or verifying it against
/// the database, never while a query runs.
#[derive(Debug)]
pub(super) struct InvalidSchema {
    message: Box<str>,
}

impl std::error::Error for InvalidSchema {}

impl core::fmt::Display for InvalidSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid schema: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidSchema(InvalidSchema {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid schema error.
    pub fn is_invalid_schema(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidSchema(_))
    }
}
