use crate::payment::GatewayConfig;

/// 服务器配置 - 店面订单服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/storefront | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | DATABASE_FILE | storefront.db | SQLite 数据库文件名 |
/// | GATEWAY_PAY_URL | (sandbox) | 支付网关收银台地址 |
/// | GATEWAY_RETURN_URL | http://localhost:3000/api/payment/callback | 回调地址 |
/// | GATEWAY_MERCHANT_CODE | (空) | 网关商户号 |
/// | GATEWAY_SECRET_KEY | (空) | 网关签名密钥 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/storefront HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// SQLite 数据库文件名 (相对于 work_dir)
    pub database_file: String,

    // === 支付网关配置 ===
    pub gateway_pay_url: String,
    pub gateway_return_url: String,
    pub gateway_merchant_code: String,
    pub gateway_secret_key: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/storefront".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            database_file: std::env::var("DATABASE_FILE")
                .unwrap_or_else(|_| "storefront.db".into()),

            gateway_pay_url: std::env::var("GATEWAY_PAY_URL").unwrap_or_else(|_| {
                "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".into()
            }),
            gateway_return_url: std::env::var("GATEWAY_RETURN_URL")
                .unwrap_or_else(|_| "http://localhost:3000/api/payment/callback".into()),
            gateway_merchant_code: std::env::var("GATEWAY_MERCHANT_CODE").unwrap_or_default(),
            gateway_secret_key: std::env::var("GATEWAY_SECRET_KEY").unwrap_or_default(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库文件完整路径
    pub fn database_path(&self) -> String {
        format!("{}/{}", self.work_dir, self.database_file)
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            merchant_code: self.gateway_merchant_code.clone(),
            secret_key: self.gateway_secret_key.clone(),
            pay_url: self.gateway_pay_url.clone(),
            return_url: self.gateway_return_url.clone(),
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
