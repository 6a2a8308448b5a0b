//! Shipper API Module
//!
//! Work queue, accept/deliver actions and the COD collection summary.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Shipper router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/shipper", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders", get(handler::work_queue))
        .route("/orders/history", get(handler::history))
        .route("/orders/{id}/accept", post(handler::accept))
        .route("/orders/{id}/deliver", post(handler::deliver))
        .route("/orders/{id}/cod-delivered", post(handler::cod_delivered))
        .route("/stats", get(handler::stats))
}
