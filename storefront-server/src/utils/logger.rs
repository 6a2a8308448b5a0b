//! 日志基础设施
//!
//! tracing 初始化: stdout 输出, 可选按天滚动的文件输出。
//! `RUST_LOG` 覆盖传入的默认级别。

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize logging to stdout only
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize logging, optionally mirrored to a daily-rolling file under
/// `log_dir`. Falls back to stdout when the directory is missing.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("info")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    if let Some(dir) = log_dir
        && Path::new(dir).is_dir()
    {
        let appender = tracing_appender::rolling::daily(dir, "storefront-server");
        builder.with_writer(appender).with_ansi(false).init();
        return;
    }

    builder.init();
}
