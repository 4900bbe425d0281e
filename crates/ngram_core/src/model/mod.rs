//! N-gram domain model.
//!
//! # Responsibility
//! - Define the order newtype and the typed row shared by every store call.
//! - Own the validation rules applied before any SQL is executed.
//!
//! # Invariants
//! - An order is always a positive integer.
//! - A row carries exactly `order` words.

pub mod ngram;
