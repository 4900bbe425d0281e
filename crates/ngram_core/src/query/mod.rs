//! SQL statement construction for n-gram tables.
//!
//! # Responsibility
//! - Derive insert/select/create statements from the n-gram order.
//! - Keep dialect differences (identifier quoting, column types) in one place.
//!
//! # Invariants
//! - Word columns are always `word1..wordN` in ascending order, then `count`.
//! - Values never appear in statement text; every value is a `?` placeholder.

pub mod templates;
