use super::Error;

/// Error when the database rejects or fails a SQL statement.
///
/// Carries the SQL text that was sent so the failure can be diagnosed without
/// re-rendering the query.
#[derive(Debug)]
pub(super) struct StatementFailed {
    sql: Box<str>,
    inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for StatementFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for StatementFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "statement failed: {}; sql={}", self.inner, self.sql)
    }
}

impl Error {
    /// Creates a statement failure wrapping the driver error `err` raised for
    /// `sql`.
    pub fn statement_failed(
        sql: impl Into<String>,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Error {
        Error::from(super::ErrorKind::StatementFailed(StatementFailed {
            sql: sql.into().into(),
            inner: Box::new(err),
        }))
    }

    /// Returns `true` if this error is a statement failure.
    pub fn is_statement_failed(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::StatementFailed(_))
    }

    /// The SQL text of a failed or timed out statement.
    pub fn sql(&self) -> Option<&str> {
        match self.kind() {
            super::ErrorKind::StatementFailed(err) => Some(&err.sql),
            super::ErrorKind::StatementTimedOut(err) => err.sql(),
            _ => None,
        }
    }
}
