//! Papyr DB - Record store for extraction records using SQLite.

mod database;
mod error;
mod migrations;
mod operations;

pub use database::Database;
pub use error::{DbError, DbResult};
pub use operations::stats::DocumentStats;
