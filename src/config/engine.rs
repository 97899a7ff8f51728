/// 引擎初始化配置

use std::ffi::CString;

use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult};
use crate::ffi::{InitFlagName, InitFlags};

/// `sv_init` 参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 引擎配置串，例如 `"buffer=1024|audiodriver=alsa"`；`None` 时传空指针
    pub config: Option<String>,

    /// 采样率
    pub sample_rate: u32,

    /// 声道数
    pub channels: u32,

    /// 初始化标志
    pub flags: Vec<InitFlagName>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            config: None,
            sample_rate: 44100,
            channels: 2,
            flags: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// 离线渲染：由调用方拉取音频，16 位整数采样
    pub fn offline(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            flags: vec![
                InitFlagName::UserAudioCallback,
                InitFlagName::AudioInt16,
                InitFlagName::OneThread,
            ],
            ..Self::default()
        }
    }

    /// 保留配置串、采样率与声道数，只把标志换成离线渲染的组合
    pub fn to_offline(&self) -> Self {
        Self {
            config: self.config.clone(),
            channels: self.channels,
            ..Self::offline(self.sample_rate)
        }
    }

    /// 合并后的标志位
    pub fn init_flags(&self) -> InitFlags {
        self.flags.iter().copied().collect()
    }

    /// 配置串的 C 表示
    pub fn config_cstring(&self) -> ConfigResult<Option<CString>> {
        self.config
            .as_deref()
            .map(|s| {
                CString::new(s).map_err(|_| {
                    ConfigError::ValidationError("Engine config string contains NUL".to_string())
                })
            })
            .transpose()
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.sample_rate == 0 || self.sample_rate > i32::MAX as u32 {
            return Err(ConfigError::ValidationError("Invalid sample rate".to_string()));
        }
        if self.channels == 0 || self.channels > i32::MAX as u32 {
            return Err(ConfigError::ValidationError("Invalid channel count".to_string()));
        }
        let flags = self.init_flags();
        if flags.contains(InitFlags::AUDIO_INT16) && flags.contains(InitFlags::AUDIO_FLOAT32) {
            return Err(ConfigError::ValidationError(
                "audio_int16 and audio_float32 are mutually exclusive".to_string(),
            ));
        }
        self.config_cstring()?;
        Ok(())
    }
}
