use super::Error;

/// Error when a string is not an OID of the form `typeId.objectId`.
#[derive(Debug)]
pub(super) struct InvalidOid {
    oid: Box<str>,
}

impl std::error::Error for InvalidOid {}

impl core::fmt::Display for InvalidOid {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid OID `{}`; expected `typeId.objectId`", self.oid)
    }
}

impl Error {
    /// Creates an invalid OID error.
    pub fn invalid_oid(oid: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidOid(InvalidOid {
            oid: oid.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid OID error.
    pub fn is_invalid_oid(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidOid(_))
    }
}
