use std::sync::Arc;

use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::orders::OrderLifecycleManager;
use crate::payment::PaymentGateway;
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是店面订单服务的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Arc<Config> | 配置项 (不可变) |
/// | db | DbService | 嵌入式数据库 (SQLite) |
/// | gateway | Arc<PaymentGateway> | 支付网关适配器 |
/// | orders | OrderLifecycleManager | 订单生命周期管理 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Arc<Config>,
    /// 嵌入式数据库 (SQLite)
    pub db: DbService,
    /// 支付网关适配器
    pub gateway: Arc<PaymentGateway>,
    /// 订单生命周期管理
    pub orders: OrderLifecycleManager,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 数据库 (work_dir/database_file, 自动执行迁移)
    /// 2. 支付网关 (从配置读取商户号和密钥)
    /// 3. 订单管理器
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;

        let db = DbService::new(&config.database_path()).await?;
        let gateway = Arc::new(PaymentGateway::new(config.gateway_config()));
        let orders = OrderLifecycleManager::new(db.pool.clone(), gateway.clone());

        if config.gateway_merchant_code.is_empty() {
            tracing::warn!("GATEWAY_MERCHANT_CODE is empty, online payment is not configured");
        }

        Ok(Self {
            config: Arc::new(config.clone()),
            db,
            gateway,
            orders,
        })
    }

    /// 基于已有连接池构造状态 (测试用)
    pub fn with_pool(config: Config, pool: SqlitePool) -> Self {
        let db = DbService::from_pool(pool);
        let gateway = Arc::new(PaymentGateway::new(config.gateway_config()));
        let orders = OrderLifecycleManager::new(db.pool.clone(), gateway.clone());
        Self {
            config: Arc::new(config),
            db,
            gateway,
            orders,
        }
    }

    /// 获取数据库连接池
    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }
}
