//! N-gram order and row types.
//!
//! # Responsibility
//! - Represent the order `N` selecting the `{N}grams` table.
//! - Represent one persisted row: `N` words plus an occurrence count.
//!
//! # Invariants
//! - `NgramOrder` is never zero and never changes for a given store.
//! - Counts fit the signed 64-bit storage column.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;

/// Total number of 1-grams in the 2008 Google Books English corpus.
pub const ONE_GRAM_TOTAL_2008: u64 = 561_087_129;

/// Validation failures raised before a statement reaches the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NgramValidationError {
    /// Order must be at least 1.
    InvalidOrder(usize),
    /// Word sequence length differs from the store order.
    Arity { expected: usize, actual: usize },
    /// Count does not fit the signed 64-bit `count` column.
    CountOutOfRange(u64),
}

impl Display for NgramValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOrder(value) => write!(f, "ngram order must be positive, got {value}"),
            Self::Arity { expected, actual } => {
                write!(f, "expected {expected} words, got {actual}")
            }
            Self::CountOutOfRange(count) => {
                write!(f, "count {count} exceeds the storable maximum {}", i64::MAX)
            }
        }
    }
}

impl Error for NgramValidationError {}

/// Order `N` of the n-grams handled by one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NgramOrder(NonZeroUsize);

impl NgramOrder {
    /// Creates an order, rejecting zero.
    pub fn new(value: usize) -> Result<Self, NgramValidationError> {
        NonZeroUsize::new(value)
            .map(Self)
            .ok_or(NgramValidationError::InvalidOrder(value))
    }

    /// Returns `N`.
    pub fn get(self) -> usize {
        self.0.get()
    }

    /// Returns the table backing this order, e.g. `3grams`.
    pub fn table_name(self) -> String {
        format!("{}grams", self.0)
    }

    /// Checks that a word sequence has exactly `N` entries.
    pub fn check_arity(self, actual: usize) -> Result<(), NgramValidationError> {
        if actual == self.get() {
            return Ok(());
        }
        Err(NgramValidationError::Arity {
            expected: self.get(),
            actual,
        })
    }
}

impl Display for NgramOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of a `{N}grams` table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NgramRow {
    /// `word1..wordN` in column order.
    pub words: Vec<String>,
    /// Number of occurrences.
    pub count: u64,
}

impl NgramRow {
    pub fn new<I, S>(words: I, count: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            count,
        }
    }

    /// Number of words carried by this row.
    pub fn order(&self) -> usize {
        self.words.len()
    }

    /// Words joined by single spaces, the way the corpus prints n-grams.
    pub fn phrase(&self) -> String {
        self.words.join(" ")
    }
}

/// Converts an API count into its storage representation.
pub fn count_to_db(count: u64) -> Result<i64, NgramValidationError> {
    i64::try_from(count).map_err(|_| NgramValidationError::CountOutOfRange(count))
}

/// Share of `count` among all 1-grams of the 2008 corpus.
pub fn relative_frequency_2008(count: u64) -> f64 {
    count as f64 / ONE_GRAM_TOTAL_2008 as f64
}

#[cfg(test)]
mod tests {
    use super::{count_to_db, relative_frequency_2008, NgramOrder, NgramRow, NgramValidationError};

    #[test]
    fn zero_order_is_rejected() {
        assert_eq!(
            NgramOrder::new(0).unwrap_err(),
            NgramValidationError::InvalidOrder(0)
        );
    }

    #[test]
    fn table_name_follows_order() {
        assert_eq!(NgramOrder::new(1).unwrap().table_name(), "1grams");
        assert_eq!(NgramOrder::new(5).unwrap().table_name(), "5grams");
    }

    #[test]
    fn check_arity_reports_expected_and_actual() {
        let order = NgramOrder::new(2).unwrap();
        assert!(order.check_arity(2).is_ok());
        assert_eq!(
            order.check_arity(3).unwrap_err(),
            NgramValidationError::Arity {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn count_above_i64_max_is_rejected() {
        assert_eq!(count_to_db(42).unwrap(), 42);
        assert_eq!(
            count_to_db(u64::MAX).unwrap_err(),
            NgramValidationError::CountOutOfRange(u64::MAX)
        );
    }

    #[test]
    fn relative_frequency_of_full_corpus_is_one() {
        assert!((relative_frequency_2008(super::ONE_GRAM_TOTAL_2008) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn row_serializes_words_and_count() {
        let row = NgramRow::new(["the", "dog"], 3);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["words"][1], "dog");
        assert_eq!(json["count"], 3);
        assert_eq!(row.phrase(), "the dog");
    }
}
