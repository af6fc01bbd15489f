//! Papyr Core - Core types and domain models for the Papyr OCR pipeline.

mod error;
mod types;

pub use error::{Error, Result};
pub use types::*;
