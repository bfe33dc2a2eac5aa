use crate::{Error, Result, Value};

use chrono::NaiveDateTime;
use efaps_core::stmt::RowSet;
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::debug;

/// In-memory rows keyed by an id column.
///
/// The first [`populate`](Self::populate) loads rows. Later calls supply
/// additional columns for the keys already known, correlating several
/// statements on the client. With a sub key the buffer is in *expand* shape:
/// each key maps to a list of rows.
#[derive(Debug, Default)]
pub struct CachedResult {
    rows: IndexMap<i64, Vec<Vec<Value>>>,
    multiple: bool,
    width: usize,

    /// Position of the sub key inside stored rows
    sub_key_index: Option<usize>,

    cursor: Cursor,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    #[default]
    BeforeFirst,
    At(usize, usize),
    AfterLast,
}

impl CachedResult {
    pub fn new() -> CachedResult {
        CachedResult::default()
    }

    /// Consumes `rows`, keyed by the integer column at `key_index`.
    ///
    /// Without a sub key, a repeated key overwrites the earlier row. With a
    /// sub key, rows accumulate per key. Once the buffer holds rows, the
    /// columns of `rows` other than the key columns are appended to the
    /// stored rows with the same key (and sub key). Rows with unknown keys
    /// are skipped; stored rows without a match are padded with `Null`.
    pub fn populate(
        &mut self,
        rows: RowSet,
        key_index: usize,
        sub_key_index: Option<usize>,
    ) -> Result<()> {
        if self.rows.is_empty() {
            self.load(rows, key_index, sub_key_index)
        } else {
            self.merge(rows, key_index, sub_key_index)
        }
    }

    fn load(&mut self, rows: RowSet, key_index: usize, sub_key_index: Option<usize>) -> Result<()> {
        self.width = rows.width;
        self.multiple = sub_key_index.is_some();
        self.sub_key_index = sub_key_index;

        for row in rows {
            let key = key_of(&row, key_index)?;

            if self.multiple {
                self.rows.entry(key).or_default().push(row);
            } else {
                self.rows.insert(key, vec![row]);
            }
        }

        self.cursor = Cursor::BeforeFirst;
        Ok(())
    }

    fn merge(&mut self, rows: RowSet, key_index: usize, sub_key_index: Option<usize>) -> Result<()> {
        let extra = rows
            .width
            .saturating_sub(1 + usize::from(sub_key_index.is_some()));
        let mut incoming = HashMap::with_capacity(rows.len());

        for row in rows {
            let key = key_of(&row, key_index)?;
            let sub_key = sub_key_index.and_then(|index| row.get(index)?.as_i64());

            let columns: Vec<Value> = row
                .into_iter()
                .enumerate()
                .filter(|(index, _)| *index != key_index && Some(*index) != sub_key_index)
                .map(|(_, value)| value)
                .collect();

            incoming.insert((key, sub_key), columns);
        }

        for (key, stored) in &mut self.rows {
            for row in stored {
                let sub_key = match (sub_key_index, self.sub_key_index) {
                    (Some(_), Some(index)) => row.get(index).and_then(Value::as_i64),
                    _ => None,
                };

                match incoming.remove(&(*key, sub_key)) {
                    Some(columns) => row.extend(columns),
                    None => row.extend(std::iter::repeat(Value::Null).take(extra)),
                }
            }
        }

        if !incoming.is_empty() {
            debug!(skipped = incoming.len(), "rows without a matching key skipped");
        }

        self.width += extra;
        Ok(())
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Number of columns of every stored row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains_key(&self, key: i64) -> bool {
        self.rows.contains_key(&key)
    }

    /// Rows stored for `key`, in insertion order.
    pub fn rows_for(&self, key: i64) -> &[Vec<Value>] {
        self.rows.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Moves the cursor in front of the first row.
    pub fn before_first(&mut self) {
        self.cursor = Cursor::BeforeFirst;
    }

    /// Advances to the next row in insertion order. Returns `false` once the
    /// rows are exhausted, until [`before_first`](Self::before_first) is
    /// called.
    pub fn next(&mut self) -> bool {
        let mut candidate = match self.cursor {
            Cursor::BeforeFirst => (0, 0),
            Cursor::At(key, row) => (key, row + 1),
            Cursor::AfterLast => return false,
        };

        loop {
            let Some((_, rows)) = self.rows.get_index(candidate.0) else {
                self.cursor = Cursor::AfterLast;
                return false;
            };

            if candidate.1 < rows.len() {
                self.cursor = Cursor::At(candidate.0, candidate.1);
                return true;
            }

            candidate = (candidate.0 + 1, 0);
        }
    }

    /// The row under the cursor.
    pub fn current(&self) -> Option<&[Value]> {
        match self.cursor {
            Cursor::At(key, row) => self
                .rows
                .get_index(key)
                .and_then(|(_, rows)| rows.get(row))
                .map(Vec::as_slice),
            _ => None,
        }
    }

    /// Column `index` of the row under the cursor.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.current()?.get(index)
    }

    /// Column `index` of the row under the cursor, read as a timestamp.
    /// Dates read as midnight.
    pub fn get_date_time(&self, index: usize) -> Result<Option<NaiveDateTime>> {
        match self.get(index) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::DateTime(value)) => Ok(Some(*value)),
            Some(Value::Date(value)) => Ok(value.and_hms_opt(0, 0, 0)),
            Some(value) => Err(Error::invalid_result(format!(
                "column {index} is not a timestamp; got {}",
                value.kind_name()
            ))),
        }
    }
}

fn key_of(row: &[Value], index: usize) -> Result<i64> {
    row.get(index).and_then(Value::as_i64).ok_or_else(|| {
        Error::invalid_result(format!("key column {index} is not an integer"))
    })
}
