//! Bookkeeping and feeds for the betting analytics engine.
//!
//! This crate provides:
//! - `PickBook`: thread-safe pick store with exactly-once settlement
//! - CSV readers for market lines, model estimates and game results
//! - CSV writers for picks and settlements

pub mod csv_storage;
pub mod pick_book;

pub use csv_storage::{CsvStorage, GameResultRecord};
pub use pick_book::PickBook;
