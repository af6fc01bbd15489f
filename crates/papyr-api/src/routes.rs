//! API route definitions.

use crate::handlers::{self, SharedState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Creates the API router with all routes configured
pub fn create_router(state: SharedState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Document routes
        .nest("/ocr", ocr_routes())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn ocr_routes() -> Router<SharedState> {
    Router::new()
        .route("/upload", post(handlers::upload))
        .route(
            "/doc/:id",
            get(handlers::get_document)
                .patch(handlers::update_document)
                .delete(handlers::delete_document),
        )
        .route("/doc/:id/export/:format", get(handlers::export_document))
        .route("/doc/:id/download", get(handlers::download_document))
        .route("/message/:message_id", get(handlers::document_for_message))
}

/// Prints all available routes for logging
pub fn print_routes() {
    info!("Available API routes:");
    info!("  GET    /health                       - Health check with tool availability");
    info!("  POST   /ocr/upload                   - Upload a document for OCR");
    info!("  GET    /ocr/doc/:id                  - Get a document");
    info!("  PATCH  /ocr/doc/:id                  - Update tags or structured data");
    info!("  DELETE /ocr/doc/:id                  - Delete a document");
    info!("  GET    /ocr/doc/:id/export/:format   - Export as csv, json, xlsx or xls");
    info!("  GET    /ocr/doc/:id/download         - Download the original upload");
    info!("  GET    /ocr/message/:message_id      - Document attached to a message");
}

/// Serve the API on `addr` until Ctrl-C.
pub async fn serve(state: SharedState, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Papyr API listening on http://{}", listener.local_addr()?);
    print_routes();

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
