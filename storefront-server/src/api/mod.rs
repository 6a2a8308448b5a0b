//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`products`] - 商品目录接口
//! - [`cart`] - 购物车接口
//! - [`orders`] - 订单生命周期接口
//! - [`payment`] - 支付网关回调接口
//! - [`shipper`] - 配送员工作流接口

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub mod cart;
pub mod health;
pub mod orders;
pub mod payment;
pub mod products;
pub mod shipper;

/// Assemble the full application router with middleware layers
pub fn build_router(state: ServerState) -> Router {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(orders::router())
        .merge(payment::router())
        .merge(shipper::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
