//! Forward-only cursors over query results.
//!
//! Cursors borrow the statement they were produced by, so they only live
//! inside the closure handed to `NgramStore::get_rows` /
//! `NgramStore::custom_query`. The statement is reset when that closure
//! returns, whether or not the cursor was drained.

use super::ngram_store::{StoreError, StoreResult};
use crate::model::ngram::{NgramOrder, NgramRow};
use rusqlite::types::Value;
use rusqlite::{Row, Rows};
use std::cell::Cell;
use std::iter::FusedIterator;

/// Typed, single-pass cursor over `{N}grams` rows.
///
/// Yields `Err` at most once; the cursor is exhausted afterwards.
pub struct NgramRows<'stmt> {
    rows: Rows<'stmt>,
    order: NgramOrder,
    yielded: &'stmt Cell<usize>,
    finished: bool,
}

impl<'stmt> NgramRows<'stmt> {
    /// `yielded` counts successfully decoded rows for outcome logging.
    pub(crate) fn new(
        rows: Rows<'stmt>,
        order: NgramOrder,
        yielded: &'stmt Cell<usize>,
    ) -> Self {
        Self {
            rows,
            order,
            yielded,
            finished: false,
        }
    }
}

impl Iterator for NgramRows<'_> {
    type Item = StoreResult<NgramRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let item = match self.rows.next() {
            Ok(Some(row)) => parse_ngram_row(row, self.order),
            Ok(None) => {
                self.finished = true;
                return None;
            }
            Err(err) => Err(err.into()),
        };
        match &item {
            Ok(_) => self.yielded.set(self.yielded.get() + 1),
            Err(_) => self.finished = true,
        }
        Some(item)
    }
}

impl FusedIterator for NgramRows<'_> {}

/// Untyped, single-pass cursor for caller-supplied statements.
pub struct RawRows<'stmt> {
    rows: Rows<'stmt>,
    column_names: Vec<String>,
    yielded: &'stmt Cell<usize>,
    finished: bool,
}

impl<'stmt> RawRows<'stmt> {
    pub(crate) fn new(
        rows: Rows<'stmt>,
        column_names: Vec<String>,
        yielded: &'stmt Cell<usize>,
    ) -> Self {
        Self {
            rows,
            column_names,
            yielded,
            finished: false,
        }
    }

    /// Result column names in select-list order.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }
}

impl Iterator for RawRows<'_> {
    type Item = StoreResult<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let width = self.column_names.len();
        let item = match self.rows.next() {
            Ok(Some(row)) => (0..width)
                .map(|index| row.get::<_, Value>(index))
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(StoreError::from),
            Ok(None) => {
                self.finished = true;
                return None;
            }
            Err(err) => Err(err.into()),
        };
        match &item {
            Ok(_) => self.yielded.set(self.yielded.get() + 1),
            Err(_) => self.finished = true,
        }
        Some(item)
    }
}

impl FusedIterator for RawRows<'_> {}

fn parse_ngram_row(row: &Row<'_>, order: NgramOrder) -> StoreResult<NgramRow> {
    let mut words = Vec::with_capacity(order.get());
    for i in 1..=order.get() {
        let column = format!("word{i}");
        words.push(row.get::<_, String>(column.as_str())?);
    }

    let stored: i64 = row.get("count")?;
    let count = u64::try_from(stored).map_err(|_| {
        StoreError::InvalidData(format!(
            "negative count `{stored}` in {}.count",
            order.table_name()
        ))
    })?;

    Ok(NgramRow { words, count })
}
