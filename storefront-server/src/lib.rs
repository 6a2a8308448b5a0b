//! Storefront Server - 店面订单履约服务
//!
//! # 架构概述
//!
//! 本模块是订单服务的主入口，提供以下核心功能：
//!
//! - **订单生命周期** (`orders`): 购物车结算、支付对账、配送工作流
//! - **库存账本** (`inventory`): 原子化的守卫扣减和补偿回退
//! - **支付网关** (`payment`): VNPay 风格的签名重定向和回调验证
//! - **数据库** (`db`): 嵌入式 SQLite 存储 (WAL)
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! storefront-server/src/
//! ├── core/          # 配置、状态、HTTP 服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── orders/        # 订单生命周期管理
//! ├── inventory/     # 库存账本
//! ├── payment/       # 支付网关适配器
//! ├── db/            # 数据库层 (repository)
//! └── utils/         # 错误、日志、时间工具
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod inventory;
pub mod orders;
pub mod payment;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use orders::{OrderFlowError, OrderLifecycleManager};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   _____ __                  ____                 __
  / ___// /_____  ________  / __/________  ____  / /_
  \__ \/ __/ __ \/ ___/ _ \/ /_/ ___/ __ \/ __ \/ __/
 ___/ / /_/ /_/ / /  /  __/ __/ /  / /_/ / / / / /_
/____/\__/\____/_/   \___/_/ /_/   \____/_/ /_/\__/
    "#
    );
}
