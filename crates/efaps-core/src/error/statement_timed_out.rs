use std::time::Duration;

use crate::{error::ErrorKind, Error};

#[derive(Debug)]
pub(super) struct StatementTimedOut {
    sql: Option<Box<str>>,
    timeout: Duration,
}

impl StatementTimedOut {
    pub(super) fn sql(&self) -> Option<&str> {
        self.sql.as_deref()
    }
}

impl Error {
    /// Creates a timeout error for a statement interrupted after `timeout`.
    ///
    /// `sql` is `None` when the deadline already passed before the statement
    /// was sent.
    pub fn statement_timed_out(sql: Option<String>, timeout: Duration) -> Error {
        ErrorKind::StatementTimedOut(StatementTimedOut {
            sql: sql.map(Into::into),
            timeout,
        })
        .into()
    }

    /// Returns `true` if this error is a statement timeout.
    pub fn is_statement_timed_out(&self) -> bool {
        matches!(self.kind(), ErrorKind::StatementTimedOut(_))
    }
}

impl std::error::Error for StatementTimedOut {}

impl core::fmt::Display for StatementTimedOut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "statement timed out after {:?}", self.timeout)?;
        if let Some(sql) = &self.sql {
            write!(f, "; sql={sql}")?;
        }
        Ok(())
    }
}
