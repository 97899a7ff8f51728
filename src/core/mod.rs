//! 核心模块
//!
//! - `error` - 错误类型定义

pub mod error;

// 重新导出错误类型
pub use error::{BindingError, BindingResult, ConfigError, ConfigResult};
