//! Defines routes for the product catalog.
//!
//! ## Structure
//! - **Product screens**
//!   - `GET  /Product`                 — list
//!   - `GET  /Product/Details/{id}`    — single product
//!   - `GET  /Product/Create`          — empty form
//!   - `POST /Product/Create`          — submit new product (multipart)
//!   - `GET  /Product/Edit/{id}`       — pre-filled form
//!   - `POST /Product/Edit`            — submit changes (multipart, id in body)
//!   - `GET  /Product/Delete/{id}`     — confirmation
//!   - `POST /Product/Delete/{id}`     — delete
//!
//! - **Assets & health checks**
//!   - `GET /images/{file_name}`       — stored product image
//!   - `GET /healthz`, `GET /readyz`

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        image_handlers::get_image,
        product_handlers::{
            create_form, create_product, delete_confirm, delete_product, details, edit_form,
            edit_product, index,
        },
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Build the router for every catalog route. Handlers share `AppState`.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Product screens
        .route("/Product", get(index))
        .route("/Product/Index", get(index))
        .route("/Product/Details/{id}", get(details))
        .route("/Product/Create", get(create_form).post(create_product))
        .route("/Product/Edit", post(edit_product))
        .route("/Product/Edit/{id}", get(edit_form))
        .route(
            "/Product/Delete/{id}",
            get(delete_confirm).post(delete_product),
        )
        // Stored images
        .route("/images/{file_name}", get(get_image))
}

/// The complete application: routes, upload size limit and request tracing.
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    routes()
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
