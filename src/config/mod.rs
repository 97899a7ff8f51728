/// 统一配置系统
///
/// 提供TOML/JSON配置文件、环境变量覆盖和验证
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub mod engine;
pub mod library;

pub use crate::core::{ConfigError, ConfigResult};
pub use engine::EngineConfig;
pub use library::LibraryConfig;

/// 当前目录下查找的配置文件名
pub const CONFIG_FILE_TOML: &str = "sunvox.toml";
pub const CONFIG_FILE_JSON: &str = "sunvox.json";

/// 绑定层主配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// 动态库位置
    #[serde(default)]
    pub library: LibraryConfig,

    /// 引擎初始化参数
    #[serde(default)]
    pub engine: EngineConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BindingConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 保存为JSON文件
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// 按给定的查找函数覆盖配置，键名与环境变量相同
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // 库位置
        if let Some(val) = lookup("SUNVOX_LIBRARY_PATH") {
            self.library.path = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("SUNVOX_LIBRARY_ROOT") {
            self.library.root = PathBuf::from(val);
        }
        if let Some(val) = lookup("SUNVOX_PLATFORM") {
            self.library.platform = Some(val);
        }

        // 引擎参数
        if let Some(val) = lookup("SUNVOX_SAMPLE_RATE") {
            if let Ok(rate) = val.parse() {
                self.engine.sample_rate = rate;
            }
        }
        if let Some(val) = lookup("SUNVOX_CHANNELS") {
            if let Ok(channels) = val.parse() {
                self.engine.channels = channels;
            }
        }

        // 日志
        if let Some(val) = lookup("SUNVOX_LOG_LEVEL") {
            if let Ok(level) = val.parse() {
                self.logging.level = level;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.library.validate()?;
        self.engine.validate()?;
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./sunvox.toml
    /// 2. ./sunvox.json
    /// 3. <用户配置目录>/sunvox/config.toml
    /// 4. 使用默认配置
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::from_toml_file(CONFIG_FILE_TOML) {
            tracing::info!(target: "sunvox", "Loaded config from {}", CONFIG_FILE_TOML);
            return config;
        }

        if let Ok(config) = Self::from_json_file(CONFIG_FILE_JSON) {
            tracing::info!(target: "sunvox", "Loaded config from {}", CONFIG_FILE_JSON);
            return config;
        }

        if let Some(config_path) = Self::user_config_path() {
            if let Ok(config) = Self::from_toml_file(&config_path) {
                tracing::info!(target: "sunvox", "Loaded config from {:?}", config_path);
                return config;
            }
        }

        tracing::info!(target: "sunvox", "Using default configuration");
        Self::default()
    }

    /// 用户配置文件路径
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sunvox").join("config.toml"))
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别，`RUST_LOG` 存在时以其为准
    pub level: LogLevel,

    /// 是否输出 ANSI 颜色
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            ansi: true,
        }
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(ConfigError::ParseError(format!("Unknown log level: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::InitFlagName;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = BindingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.sample_rate, 44100);
        assert_eq!(config.library.root, PathBuf::from("sunvox_dll"));
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = BindingConfig::default();
        config.engine.flags = vec![InitFlagName::UserAudioCallback, InitFlagName::AudioFloat32];
        config.library.platform = Some("linux-arm64".to_string());

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: BindingConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_json_serialization() {
        let config = BindingConfig::default();
        let json_str = serde_json::to_string(&config).unwrap();
        let parsed: BindingConfig = serde_json::from_str(&json_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml() {
        let config = BindingConfig::from_toml_str(
            r#"
            [engine]
            sample_rate = 48000
            flags = ["user_audio_callback", "one_thread"]

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.sample_rate, 48000);
        assert_eq!(config.engine.channels, 2);
        assert_eq!(config.engine.init_flags().bits(), 2 | 16);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.library, LibraryConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let err = BindingConfig::from_toml_str("[engine]\nsample_rate = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let toml_path = dir.path().join("sunvox.toml");
        let json_path = dir.path().join("sunvox.json");

        let mut config = BindingConfig::default();
        config.library.path = Some(PathBuf::from("/opt/sunvox/sunvox.so"));
        config.save_toml(&toml_path).unwrap();
        config.save_json(&json_path).unwrap();

        assert_eq!(BindingConfig::from_toml_file(&toml_path).unwrap(), config);
        assert_eq!(BindingConfig::from_json_file(&json_path).unwrap(), config);
        assert!(matches!(
            BindingConfig::from_toml_file(dir.path().join("missing.toml")),
            Err(ConfigError::FileError(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SUNVOX_LIBRARY_ROOT", "/srv/sunvox_lib"),
            ("SUNVOX_PLATFORM", "windows-x86"),
            ("SUNVOX_SAMPLE_RATE", "96000"),
            ("SUNVOX_CHANNELS", "not a number"),
            ("SUNVOX_LOG_LEVEL", "WARN"),
        ]
        .into_iter()
        .collect();

        let mut config = BindingConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.library.root, PathBuf::from("/srv/sunvox_lib"));
        assert_eq!(
            config.library.resolve_path().unwrap(),
            PathBuf::from("/srv/sunvox_lib/windows/lib_x86/sunvox.dll")
        );
        assert_eq!(config.engine.sample_rate, 96000);
        assert_eq!(config.engine.channels, 2);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }
}
