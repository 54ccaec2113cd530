//! Silvia API service library.
//!
//! Exposes the router and its building blocks so integration tests can drive
//! the service without binding a socket.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod satellite;
pub mod state;
pub mod storage;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    routing::{get, get_service, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use state::AppState;

/// Build the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let frontend = state.config.frontend_dir.clone();

    Router::new()
        // GeoTIFF endpoints
        .route(
            "/api/upload-geotiff",
            post(handlers::upload_handler).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/api/geotiff-metadata/:filename",
            get(handlers::metadata_handler),
        )
        .route(
            "/api/geotiff-band/:filename/:band_index",
            get(handlers::band_handler),
        )
        // Satellite proxy
        .route("/api/satellite-image", get(handlers::satellite_image_handler))
        // Probes
        .route("/api/today", get(handlers::today_handler))
        .route("/api/status", get(handlers::status_handler))
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        // Frontend pages and assets
        .route("/", get_service(ServeFile::new(frontend.join("index.html"))))
        .route(
            "/silvia.html",
            get_service(ServeFile::new(frontend.join("silvia.html"))),
        )
        .route(
            "/viewer.html",
            get_service(ServeFile::new(frontend.join("viewer.html"))),
        )
        .nest_service("/static", ServeDir::new(frontend))
        // Layer extensions
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
