//! Static file server for the single-page web UI

use axum::Router;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Serve `dir`, answering unknown paths with the index file so client-side
/// routes survive a page reload
pub fn router(dir: &Path, index_file: &str) -> Router {
    let index = ServeFile::new(dir.join(index_file));
    Router::new()
        .fallback_service(ServeDir::new(dir).fallback(index))
        .layer(TraceLayer::new_for_http())
}
