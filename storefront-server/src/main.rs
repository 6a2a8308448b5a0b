use storefront_server::{Config, Server, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 工作目录, 日志)
    dotenv::dotenv().ok();
    let config = Config::from_env();

    std::fs::create_dir_all(&config.work_dir)?;
    let log_level = if config.is_production() {
        "info"
    } else {
        "debug"
    };
    init_logger_with_file(Some(log_level), Some(&config.work_dir));

    // 打印横幅
    print_banner();

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "Storefront server starting..."
    );

    // 2. 启动 HTTP 服务器
    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
