//! Order Lifecycle
//!
//! Everything that mutates an order goes through
//! [`OrderLifecycleManager`]: checkout, payment reconciliation,
//! administrative overrides and the shipper workflow. Read paths talk to
//! the repository directly.

pub mod error;
pub mod manager;

pub use error::{OrderFlowError, OrderFlowResult};
pub use manager::OrderLifecycleManager;

#[cfg(test)]
mod tests;
