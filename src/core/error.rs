//! 统一错误处理模块
//!
//! 绑定层只定义初始化阶段的错误：
//!
//! - **加载错误**: 动态库不存在、架构不匹配或被系统加载器拒绝
//! - **符号错误**: 动态库缺少某个导出函数
//! - **配置错误**: 配置文件读取、解析或验证失败
//!
//! 引擎调用的返回码不在此处建模，原样返回给调用方。

use std::path::PathBuf;
use thiserror::Error;

/// 绑定层错误类型
#[derive(Error, Debug)]
pub enum BindingError {
    #[error("Failed to load library {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    #[error("Failed to bind symbol `{name}`: {reason}")]
    Symbol { name: String, reason: String },

    #[error("Platform not supported: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Argument cannot be marshaled: {0}")]
    Marshal(String),
}

impl BindingError {
    /// 缺失的符号名（仅符号错误）
    pub fn missing_symbol(&self) -> Option<&str> {
        match self {
            BindingError::Symbol { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type BindingResult<T> = Result<T, BindingError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
