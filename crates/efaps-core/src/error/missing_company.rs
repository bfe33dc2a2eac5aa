use super::Error;

/// Error when a company dependent type is queried while the session has no
/// company bound.
///
/// Raised during query preparation, before any SQL reaches a connection.
#[derive(Debug)]
pub(super) struct MissingCompany {
    ty: Box<str>,
}

impl std::error::Error for MissingCompany {}

impl core::fmt::Display for MissingCompany {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "type `{}` is company dependent but no company is bound to the session",
            self.ty
        )
    }
}

impl Error {
    /// Creates a missing company error for the type named `ty`.
    pub fn missing_company(ty: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::MissingCompany(MissingCompany {
            ty: ty.into().into(),
        }))
    }

    /// Returns `true` if this error is a missing company error.
    pub fn is_missing_company(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::MissingCompany(_))
    }
}
