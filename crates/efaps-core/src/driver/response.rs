use super::TableInformation;
use crate::{stmt::RowSet, Error, Result};

#[derive(Debug)]
pub struct Response {
    pub rows: Rows,
}

#[derive(Debug)]
pub enum Rows {
    /// Number of rows impacted by the operation
    Count(u64),

    /// Rows of a query
    Values(RowSet),

    /// Catalog information about one table
    Information(TableInformation),
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
        }
    }

    pub fn row_set(rows: RowSet) -> Self {
        Self {
            rows: Rows::Values(rows),
        }
    }

    pub fn information(info: TableInformation) -> Self {
        Self {
            rows: Rows::Information(info),
        }
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Self::Values(_))
    }

    pub fn into_count(self) -> Result<u64> {
        match self {
            Rows::Count(count) => Ok(count),
            _ => Err(Error::invalid_result("expected a row count")),
        }
    }

    pub fn into_values(self) -> Result<RowSet> {
        match self {
            Rows::Values(rows) => Ok(rows),
            _ => Err(Error::invalid_result("expected rows")),
        }
    }

    pub fn into_information(self) -> Result<TableInformation> {
        match self {
            Rows::Information(info) => Ok(info),
            _ => Err(Error::invalid_result("expected table information")),
        }
    }
}
