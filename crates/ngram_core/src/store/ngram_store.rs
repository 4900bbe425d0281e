//! N-gram store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert and pattern-lookup APIs over one `{N}grams` table.
//! - Keep statement text and parameter binding inside the store.
//!
//! # Invariants
//! - Word sequences are checked against the store order before any SQL runs.
//! - Bulk inserts are all-or-nothing.
//! - Values are always bound, never interpolated into statement text.

use super::rows::{NgramRows, RawRows};
use crate::config::DbSettings;
use crate::db::schema::ensure_ngram_table;
use crate::db::{open_db_in_memory, open_with_settings, DbError};
use crate::model::ngram::{count_to_db, NgramOrder, NgramRow, NgramValidationError};
use crate::query::templates::{QueryTemplates, SqlDialect};
use log::{debug, error, info, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::cell::Cell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures tied to the connection resource itself.
#[derive(Debug)]
pub enum ConnectionError {
    /// The connection could not be established.
    Open(DbError),
    /// The store was closed; no further operation is possible.
    Closed,
    /// The driver refused to close cleanly. The store is closed regardless.
    Close(rusqlite::Error),
}

impl Display for ConnectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "failed to open connection: {err}"),
            Self::Closed => write!(f, "store is closed"),
            Self::Close(err) => write!(f, "failed to close connection: {err}"),
        }
    }
}

impl Error for ConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) => Some(err),
            Self::Closed => None,
            Self::Close(err) => Some(err),
        }
    }
}

/// Error returned by every store operation.
#[derive(Debug)]
pub enum StoreError {
    Validation(NgramValidationError),
    Connection(ConnectionError),
    /// Statement preparation or execution failed.
    Query(rusqlite::Error),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Connection(err) => write!(f, "{err}"),
            Self::Query(err) => write!(f, "query failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted ngram data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Connection(err) => Some(err),
            Self::Query(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<NgramValidationError> for StoreError {
    fn from(value: NgramValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ConnectionError> for StoreError {
    fn from(value: ConnectionError) -> Self {
        Self::Connection(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::Query(err),
        }
    }
}

/// Store for one n-gram order, owning its SQLite connection.
///
/// Not meant for concurrent use: callers either serialize access or open
/// one store per concurrent caller.
pub struct NgramStore {
    conn: Option<Connection>,
    templates: QueryTemplates,
}

impl NgramStore {
    /// Wraps an already open connection.
    pub fn from_connection(order: NgramOrder, conn: Connection) -> Self {
        info!(
            "event=store_open module=store status=ok order={} table={}",
            order,
            order.table_name()
        );
        Self {
            conn: Some(conn),
            templates: QueryTemplates::new(order, SqlDialect::Sqlite),
        }
    }

    /// Opens the database described by `settings`.
    ///
    /// # Errors
    /// - `StoreError::Connection(ConnectionError::Open)` when the database
    ///   cannot be opened.
    pub fn open(order: NgramOrder, settings: &DbSettings) -> StoreResult<Self> {
        let conn = open_with_settings(settings).map_err(ConnectionError::Open)?;
        Ok(Self::from_connection(order, conn))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory(order: NgramOrder) -> StoreResult<Self> {
        let conn = open_db_in_memory().map_err(ConnectionError::Open)?;
        Ok(Self::from_connection(order, conn))
    }

    pub fn order(&self) -> NgramOrder {
        self.templates.order()
    }

    /// Name of the backing table, e.g. `2grams`.
    pub fn table_name(&self) -> String {
        self.order().table_name()
    }

    /// Statements precompiled for this store's order.
    pub fn templates(&self) -> &QueryTemplates {
        &self.templates
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    /// Borrows the owned connection.
    ///
    /// # Errors
    /// - `ConnectionError::Closed` after [`NgramStore::close`].
    pub fn connection(&self) -> StoreResult<&Connection> {
        self.conn
            .as_ref()
            .ok_or(StoreError::Connection(ConnectionError::Closed))
    }

    /// Creates the backing table when missing.
    pub fn ensure_table(&self) -> StoreResult<()> {
        ensure_ngram_table(self.connection()?, self.order())?;
        Ok(())
    }

    /// Inserts one row.
    ///
    /// # Errors
    /// - `Validation` when `words.len() != N` or `count > i64::MAX`.
    /// - `Connection` when the store is closed.
    /// - `Query` when the insert fails.
    pub fn add_count<S: AsRef<str>>(&self, words: &[S], count: u64) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = self.insert_one(words, count);
        log_outcome("ngram_add", self.order(), started_at, &result, |_| 1);
        result
    }

    fn insert_one<S: AsRef<str>>(&self, words: &[S], count: u64) -> StoreResult<()> {
        let conn = self.connection()?;
        self.order().check_arity(words.len())?;
        let count = count_to_db(count)?;

        let values = words
            .iter()
            .map(|word| Value::Text(word.as_ref().to_owned()))
            .chain(std::iter::once(Value::Integer(count)));
        let mut stmt = conn.prepare_cached(self.templates.add())?;
        stmt.execute(params_from_iter(values))?;
        Ok(())
    }

    /// Inserts every entry, all or nothing, and returns the inserted row count.
    ///
    /// All entries are validated before the first statement runs. Rows go
    /// out as multi-row inserts with bound parameters inside one savepoint;
    /// any failure rolls the whole batch back and leaves an enclosing
    /// caller transaction usable.
    pub fn add_all_counts<I, K, S>(&mut self, entries: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = (K, u64)>,
        K: AsRef<[S]>,
        S: AsRef<str>,
    {
        let started_at = Instant::now();
        let order = self.order();
        let result = self.insert_all(entries);
        log_outcome("ngram_add_all", order, started_at, &result, |rows| *rows);
        result
    }

    fn insert_all<I, K, S>(&mut self, entries: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = (K, u64)>,
        K: AsRef<[S]>,
        S: AsRef<str>,
    {
        let order = self.order();
        let conn = self
            .conn
            .as_mut()
            .ok_or(StoreError::Connection(ConnectionError::Closed))?;

        let mut values: Vec<Value> = Vec::new();
        let mut row_count = 0usize;
        for (words, count) in entries {
            let words = words.as_ref();
            order.check_arity(words.len())?;
            values.extend(words.iter().map(|word| Value::Text(word.as_ref().to_owned())));
            values.push(Value::Integer(count_to_db(count)?));
            row_count += 1;
        }

        if row_count == 0 {
            return Ok(0);
        }

        let width = order.get() + 1;
        let chunk_len = self.templates.rows_per_bulk_statement() * width;
        // Savepoints nest inside a transaction the caller may already hold.
        let sp = conn.savepoint()?;
        for chunk in values.chunks(chunk_len) {
            let sql = self.templates.bulk_add(chunk.len() / width);
            let mut stmt = sp.prepare_cached(&sql)?;
            stmt.execute(params_from_iter(chunk.iter()))?;
        }
        sp.commit()?;

        Ok(row_count)
    }

    /// Runs the lookup template and hands the matching rows to `f`.
    ///
    /// Each pattern may use SQL `LIKE` wildcards (`%`, `_`). The cursor is
    /// only valid inside `f`.
    pub fn get_rows<S, F, T>(&self, patterns: &[S], f: F) -> StoreResult<T>
    where
        S: AsRef<str>,
        F: FnOnce(NgramRows<'_>) -> T,
    {
        let started_at = Instant::now();
        let consumed = Cell::new(0);
        let result = self.select_rows(patterns, &consumed, f);
        log_outcome("ngram_get", self.order(), started_at, &result, |_| {
            consumed.get()
        });
        result
    }

    fn select_rows<S, F, T>(
        &self,
        patterns: &[S],
        consumed: &Cell<usize>,
        f: F,
    ) -> StoreResult<T>
    where
        S: AsRef<str>,
        F: FnOnce(NgramRows<'_>) -> T,
    {
        let conn = self.connection()?;
        let order = self.order();
        order.check_arity(patterns.len())?;

        let mut stmt = conn.prepare_cached(self.templates.get())?;
        let rows = stmt.query(params_from_iter(
            patterns.iter().map(|pattern| pattern.as_ref()),
        ))?;
        let value = f(NgramRows::new(rows, order, consumed));
        Ok(value)
    }

    /// Collects every row matching `patterns`.
    pub fn collect_rows<S: AsRef<str>>(&self, patterns: &[S]) -> StoreResult<Vec<NgramRow>> {
        self.get_rows(patterns, |rows| rows.collect::<StoreResult<Vec<_>>>())?
    }

    /// Runs an arbitrary statement with `args` bound as text, positionally.
    ///
    /// The number of placeholders in `sql` is not checked against `args`;
    /// the driver reports mismatches as `Query` errors.
    pub fn custom_query<S, F, T>(&self, sql: &str, args: &[S], f: F) -> StoreResult<T>
    where
        S: AsRef<str>,
        F: FnOnce(RawRows<'_>) -> T,
    {
        let started_at = Instant::now();
        let consumed = Cell::new(0);
        let result = self.run_custom(sql, args, &consumed, f);
        log_outcome("custom_query", self.order(), started_at, &result, |_| {
            consumed.get()
        });
        result
    }

    fn run_custom<S, F, T>(
        &self,
        sql: &str,
        args: &[S],
        consumed: &Cell<usize>,
        f: F,
    ) -> StoreResult<T>
    where
        S: AsRef<str>,
        F: FnOnce(RawRows<'_>) -> T,
    {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(sql)?;
        let column_names = stmt
            .column_names()
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        let rows = stmt.query(params_from_iter(args.iter().map(|arg| arg.as_ref())))?;
        let value = f(RawRows::new(rows, column_names, consumed));
        Ok(value)
    }

    /// Releases the connection. Calling it again is a no-op.
    ///
    /// # Errors
    /// - `ConnectionError::Close` when the driver reports a close failure;
    ///   the store is closed anyway.
    pub fn close(&mut self) -> StoreResult<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        match conn.close() {
            Ok(()) => {
                info!(
                    "event=store_close module=store status=ok order={}",
                    self.order()
                );
                Ok(())
            }
            Err((_conn, err)) => {
                error!(
                    "event=store_close module=store status=error order={} error_code=close_failed error={}",
                    self.order(),
                    err
                );
                Err(ConnectionError::Close(err).into())
            }
        }
    }
}

impl Drop for NgramStore {
    fn drop(&mut self) {
        if self.conn.is_none() {
            return;
        }
        if let Err(err) = self.close() {
            warn!(
                "event=store_drop module=store status=error order={} error={}",
                self.order(),
                err
            );
        }
    }
}

fn log_outcome<T>(
    event: &str,
    order: NgramOrder,
    started_at: Instant,
    result: &StoreResult<T>,
    rows: impl Fn(&T) -> usize,
) {
    match result {
        Ok(value) => debug!(
            "event={event} module=store status=ok order={order} rows={} duration_ms={}",
            rows(value),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event={event} module=store status=error order={order} duration_ms={} error_code={} error={}",
            started_at.elapsed().as_millis(),
            error_code(err),
            err
        ),
    }
}

fn error_code(err: &StoreError) -> &'static str {
    match err {
        StoreError::Validation(_) => "validation_failed",
        StoreError::Connection(_) => "connection_unavailable",
        StoreError::Query(_) => "query_failed",
        StoreError::InvalidData(_) => "invalid_data",
    }
}
