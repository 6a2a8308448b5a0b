//! Order Flow Errors

use shared::models::OrderStatus;
use thiserror::Error;

use crate::db::repository::RepoError;
use crate::inventory::LedgerError;
use crate::payment::GatewayError;
use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum OrderFlowError {
    #[error("Cart is empty")]
    CartEmpty,

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("Cannot {action}: order is {from}")]
    InvalidState { from: OrderStatus, action: String },

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type OrderFlowResult<T> = Result<T, OrderFlowError>;

impl OrderFlowError {
    pub(crate) fn invalid_state(from: OrderStatus, action: impl Into<String>) -> Self {
        Self::InvalidState {
            from,
            action: action.into(),
        }
    }
}

impl From<LedgerError> for OrderFlowError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::ProductNotFound(id) => Self::NotFound(format!("Product {id} not found")),
            LedgerError::Insufficient {
                product_id,
                requested,
                available,
            } => Self::InsufficientStock {
                product_id,
                requested,
                available,
            },
            LedgerError::Database(e) => Self::Database(e),
        }
    }
}

impl From<validator::ValidationErrors> for OrderFlowError {
    fn from(e: validator::ValidationErrors) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<OrderFlowError> for AppError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::CartEmpty => AppError::business_rule("Cart is empty"),
            err @ OrderFlowError::InsufficientStock { .. } => {
                AppError::business_rule(err.to_string())
            }
            err @ OrderFlowError::InvalidState { .. } => AppError::business_rule(err.to_string()),
            OrderFlowError::NotFound(msg) => AppError::not_found(msg),
            OrderFlowError::Validation(msg) => AppError::validation(msg),
            OrderFlowError::Gateway(err) => match err {
                GatewayError::Url(msg) => AppError::internal(msg),
                err => AppError::invalid(err.to_string()),
            },
            OrderFlowError::Repo(err) => err.into(),
            OrderFlowError::Database(err) => AppError::database(err.to_string()),
        }
    }
}
