//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - 日志、时间等工具

pub mod error;
pub mod logger;
pub mod result;
pub mod time;

pub use error::AppError;
pub use error::{ok, ok_with_message};
pub use result::AppResult;
