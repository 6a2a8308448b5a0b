//! Payment API Module
//!
//! Gateway return/notify endpoint. The gateway calls back with a signed
//! query string; signature verification happens before any field is read.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Payment router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payment", routes())
}

fn routes() -> Router<ServerState> {
    Router::new().route("/callback", get(handler::callback))
}
