//! N-gram store: row-level operations over one owned connection.
//!
//! # Responsibility
//! - Translate add/lookup calls into bound-parameter statements.
//! - Own the connection lifecycle (open, close, release on drop).
//!
//! # Invariants
//! - Every failure is returned as `StoreError`; nothing is swallowed.
//! - A closed store never touches the database again.
//! - A store is not shared across threads without external serialization;
//!   give each concurrent caller its own store.

pub mod ngram_store;
pub mod rows;
