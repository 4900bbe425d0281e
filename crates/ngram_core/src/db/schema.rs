//! `{N}grams` table provisioning.
//!
//! Production tables are usually loaded out of band; these helpers exist
//! for fresh databases and tooling.

use super::DbResult;
use crate::model::ngram::NgramOrder;
use crate::query::templates::{QueryTemplates, SqlDialect};
use log::info;
use rusqlite::Connection;

/// Creates the table for `order` unless it already exists.
pub fn ensure_ngram_table(conn: &Connection, order: NgramOrder) -> DbResult<()> {
    conn.execute_batch(&QueryTemplates::new(order, SqlDialect::Sqlite).create_table())?;
    info!(
        "event=table_ensure module=db status=ok order={} table={}",
        order,
        order.table_name()
    );
    Ok(())
}

/// Returns whether the table for `order` exists.
pub fn ngram_table_exists(conn: &Connection, order: NgramOrder) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [order.table_name()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
