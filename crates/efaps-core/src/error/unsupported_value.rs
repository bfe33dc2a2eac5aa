use super::Error;

/// Error when a host value cannot be turned into a query value.
///
/// This occurs when:
/// - A byte array or nested list is compared with an attribute
/// - A null value is used with an ordering or pattern comparison
/// - A value kind does not fit the attribute it is compared with
#[derive(Debug)]
pub(super) struct UnsupportedValue {
    value: Box<str>,
    attribute: Box<str>,
}

impl std::error::Error for UnsupportedValue {}

impl core::fmt::Display for UnsupportedValue {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "unsupported value: {} cannot be compared with attribute `{}`",
            self.value, self.attribute
        )
    }
}

impl Error {
    /// Creates an unsupported value error. `value` names the kind of the
    /// rejected value.
    pub fn unsupported_value(value: impl Into<String>, attribute: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnsupportedValue(UnsupportedValue {
            value: value.into().into(),
            attribute: attribute.into().into(),
        }))
    }

    /// Returns `true` if this error is an unsupported value error.
    pub fn is_unsupported_value(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnsupportedValue(_))
    }
}
