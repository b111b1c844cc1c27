//! 工具模块 - 通用工具函数和类型
//!
//! - [`AppError`] - 启动期错误类型
//! - [`logger`] - 日志初始化
//! - [`time`] - 时钟与营业日分桶

pub mod error;
pub mod logger;
pub mod time;

pub use error::{AppError, AppResult};
