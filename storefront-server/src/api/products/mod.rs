//! Product API Module
//!
//! Minimal catalog surface: listing, detail and the administrative
//! stock set. Full catalog management lives in the back-office system.

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

/// Product router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/stock", put(handler::update_stock))
}
