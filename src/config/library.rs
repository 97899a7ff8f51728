/// 动态库位置配置

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult};
use crate::core::BindingResult;
use crate::loader::{Platform, DEFAULT_LIBRARY_ROOT};

/// 动态库位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// 预编译库根目录
    pub root: PathBuf,

    /// 显式指定的库文件，优先于 `root` + 平台
    pub path: Option<PathBuf>,

    /// 平台标识（如 `linux-x86_64`），`None` 时使用编译目标
    pub platform: Option<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_LIBRARY_ROOT),
            path: None,
            platform: None,
        }
    }
}

impl LibraryConfig {
    /// 目标平台
    pub fn platform(&self) -> BindingResult<Platform> {
        match &self.platform {
            Some(id) => id.parse(),
            None => Platform::current(),
        }
    }

    /// 最终加载的库文件路径
    pub fn resolve_path(&self) -> BindingResult<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        Ok(self.platform()?.library_path(&self.root))
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.path.is_none() && self.root.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "Library root must not be empty".to_string(),
            ));
        }
        if let Some(id) = &self.platform {
            id.parse::<Platform>()
                .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        }
        Ok(())
    }
}
