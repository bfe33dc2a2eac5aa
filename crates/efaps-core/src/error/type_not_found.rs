use super::Error;

/// Error when a type lookup by id, UUID or name finds nothing.
#[derive(Debug)]
pub(super) struct TypeNotFound {
    key: Box<str>,
}

impl std::error::Error for TypeNotFound {}

impl core::fmt::Display for TypeNotFound {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "type not found: {}", self.key)
    }
}

impl Error {
    /// Creates a type not found error. `key` describes the lookup, e.g.
    /// `uuid=...` or `name=...`.
    pub fn type_not_found(key: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::TypeNotFound(TypeNotFound {
            key: key.into().into(),
        }))
    }

    /// Returns `true` if this error is a type not found error.
    pub fn is_type_not_found(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::TypeNotFound(_))
    }
}
