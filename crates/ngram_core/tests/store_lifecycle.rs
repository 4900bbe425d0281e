use ngram_core::{ConnectionError, DbSettings, NgramOrder, NgramRow, NgramStore, StoreError};

fn is_closed_error(err: &StoreError) -> bool {
    matches!(err, StoreError::Connection(ConnectionError::Closed))
}

#[test]
fn store_exposes_order_and_table_name() {
    let store = NgramStore::open_in_memory(NgramOrder::new(3).unwrap()).unwrap();

    assert_eq!(store.order().get(), 3);
    assert_eq!(store.table_name(), "3grams");
    assert!(!store.is_closed());
}

#[test]
fn close_is_idempotent() {
    let mut store = NgramStore::open_in_memory(NgramOrder::new(1).unwrap()).unwrap();

    store.close().unwrap();
    assert!(store.is_closed());
    store.close().unwrap();
    assert!(store.is_closed());
}

#[test]
fn every_operation_after_close_is_a_connection_error() {
    let mut store = NgramStore::open_in_memory(NgramOrder::new(1).unwrap()).unwrap();
    store.ensure_table().unwrap();
    store.close().unwrap();

    assert!(is_closed_error(&store.add_count(&["dog"], 1).unwrap_err()));
    assert!(is_closed_error(
        &store.add_all_counts(vec![(["dog"], 1)]).unwrap_err()
    ));
    assert!(is_closed_error(&store.collect_rows(&["dog"]).unwrap_err()));
    assert!(is_closed_error(
        &store
            .custom_query("SELECT 1", &[] as &[&str], |rows| rows.count())
            .unwrap_err()
    ));
    assert!(is_closed_error(&store.ensure_table().unwrap_err()));
    assert!(store.connection().is_err());
}

#[test]
fn closed_check_precedes_validation() {
    let mut store = NgramStore::open_in_memory(NgramOrder::new(2).unwrap()).unwrap();
    store.close().unwrap();

    let err = store.add_count(&["only-one"], 1).unwrap_err();
    assert!(is_closed_error(&err));
}

#[test]
fn file_store_persists_rows_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ngrams.db");
    let settings = DbSettings::for_database(path.to_str().unwrap());
    let order = NgramOrder::new(2).unwrap();

    let mut store = NgramStore::open(order, &settings).unwrap();
    store.ensure_table().unwrap();
    store.add_count(&["the", "dog"], 3).unwrap();
    store.close().unwrap();

    let reopened = NgramStore::open(order, &settings).unwrap();
    assert_eq!(
        reopened.collect_rows(&["the", "dog"]).unwrap(),
        vec![NgramRow::new(["the", "dog"], 3)]
    );
}

#[test]
fn dropping_an_open_store_releases_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dropped.db");
    let settings = DbSettings::for_database(path.to_str().unwrap());
    let order = NgramOrder::new(1).unwrap();

    {
        let store = NgramStore::open(order, &settings).unwrap();
        store.ensure_table().unwrap();
        store.add_count(&["dog"], 2).unwrap();
    }

    let mut reopened = NgramStore::open(order, &settings).unwrap();
    assert_eq!(reopened.collect_rows(&["dog"]).unwrap().len(), 1);
    reopened.close().unwrap();
}

#[test]
fn in_memory_settings_open_private_database() {
    let settings = DbSettings::for_database(":memory:");
    let store = NgramStore::open(NgramOrder::new(1).unwrap(), &settings).unwrap();

    store.ensure_table().unwrap();
    assert!(store.collect_rows(&["%"]).unwrap().is_empty());
}

#[test]
fn unreachable_database_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("ngrams.db");
    let settings = DbSettings::for_database(path.to_str().unwrap());

    let err = match NgramStore::open(NgramOrder::new(1).unwrap(), &settings) {
        Ok(_) => panic!("opening under a missing directory should fail"),
        Err(err) => err,
    };
    assert!(matches!(
        err,
        StoreError::Connection(ConnectionError::Open(_))
    ));
}
