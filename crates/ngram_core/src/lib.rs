//! Data access for n-gram frequency tables.
//!
//! A store handles one order `N` and its `{N}grams` table: single and bulk
//! inserts of word-sequence counts, `LIKE` pattern lookups, and raw
//! parameterized queries.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod store;

pub use config::{ConfigError, DbSettings};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::ngram::{
    relative_frequency_2008, NgramOrder, NgramRow, NgramValidationError, ONE_GRAM_TOTAL_2008,
};
pub use query::templates::{QueryTemplates, SqlDialect};
pub use store::ngram_store::{ConnectionError, NgramStore, StoreError, StoreResult};
pub use store::rows::{NgramRows, RawRows};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
