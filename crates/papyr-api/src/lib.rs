//! Papyr API - HTTP surface for document OCR and export.
//!
//! Routes:
//! - `POST /ocr/upload` - Upload a document (multipart: file, chat, message, tags)
//! - `GET|PATCH|DELETE /ocr/doc/:id` - Read, update or delete a record
//! - `GET /ocr/doc/:id/export/:format` - Download the inferred table
//! - `GET /ocr/doc/:id/download` - Download the original upload
//! - `GET /ocr/message/:message_id` - Record attached to a chat message
//! - `GET /health` - Liveness and external tool availability
//!
//! The caller is identified by the `X-User-Id` header, set by the
//! authentication layer in front of this service.

mod auth;
mod error;
mod handlers;
mod routes;

pub use auth::{CurrentUser, USER_HEADER};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use handlers::{AppState, SharedState};
pub use routes::{create_router, print_routes, serve};
