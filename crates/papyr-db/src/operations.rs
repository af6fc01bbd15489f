//! Database CRUD operations.

pub mod documents;
pub mod stats;
