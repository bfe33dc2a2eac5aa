use super::Error;

/// Error when a type has no attribute with the requested name.
#[derive(Debug)]
pub(super) struct UnknownAttribute {
    ty: Box<str>,
    attribute: Box<str>,
}

impl std::error::Error for UnknownAttribute {}

impl core::fmt::Display for UnknownAttribute {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "type `{}` has no attribute `{}`",
            self.ty, self.attribute
        )
    }
}

impl Error {
    /// Creates an unknown attribute error.
    pub fn unknown_attribute(ty: impl Into<String>, attribute: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownAttribute(UnknownAttribute {
            ty: ty.into().into(),
            attribute: attribute.into().into(),
        }))
    }

    /// Returns `true` if this error is an unknown attribute error.
    pub fn is_unknown_attribute(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnknownAttribute(_))
    }
}
