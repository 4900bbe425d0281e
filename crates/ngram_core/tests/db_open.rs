use ngram_core::db::schema::{ensure_ngram_table, ngram_table_exists};
use ngram_core::db::{open_db, open_db_in_memory, open_with_settings};
use ngram_core::{DbSettings, NgramOrder};

#[test]
fn ensure_table_creates_order_specific_table() {
    let conn = open_db_in_memory().unwrap();
    let order = NgramOrder::new(3).unwrap();

    assert!(!ngram_table_exists(&conn, order).unwrap());
    ensure_ngram_table(&conn, order).unwrap();
    assert!(ngram_table_exists(&conn, order).unwrap());

    let columns = table_columns(&conn, "3grams");
    assert_eq!(columns, ["word1", "word2", "word3", "count"]);
}

#[test]
fn ensure_table_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let order = NgramOrder::new(1).unwrap();

    ensure_ngram_table(&conn, order).unwrap();
    ensure_ngram_table(&conn, order).unwrap();
    assert!(ngram_table_exists(&conn, order).unwrap());
}

#[test]
fn file_database_keeps_tables_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ngrams.db");
    let order = NgramOrder::new(2).unwrap();

    let first = open_db(&path).unwrap();
    ensure_ngram_table(&first, order).unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert!(ngram_table_exists(&second, order).unwrap());
}

#[test]
fn settings_database_name_is_the_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.db");
    let settings = DbSettings::for_database(path.to_str().unwrap());

    let conn = open_with_settings(&settings).unwrap();
    ensure_ngram_table(&conn, NgramOrder::new(1).unwrap()).unwrap();
    drop(conn);

    assert!(path.exists());
}

#[test]
fn opening_under_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("ngrams.db");
    assert!(open_db(path).is_err());
}

fn table_columns(conn: &rusqlite::Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info(\"{table}\");"))
        .unwrap();
    let names = stmt
        .query_map([], |row| row.get::<_, String>("name"))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    names
}
