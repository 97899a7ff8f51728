//! 引擎常量
//!
//! 数值由引擎二进制接口固定。除原始常量外，另提供几个类型化的辅助封装，
//! 让调用方不必自行做位运算。

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

// 音符命令（写入 `NoteEvent::note`）
pub const NOTECMD_NOTE_OFF: u8 = 128;
/// 所有合成器的音符关闭
pub const NOTECMD_ALL_NOTES_OFF: u8 = 129;
/// 停止并清理所有合成器
pub const NOTECMD_CLEAN_SYNTHS: u8 = 130;
pub const NOTECMD_STOP: u8 = 131;
pub const NOTECMD_PLAY: u8 = 132;

// sv_init 标志位
pub const SV_INIT_FLAG_NO_DEBUG_OUTPUT: u32 = 1 << 0;
/// 与声卡的交互由调用方负责（通过 `sv_audio_callback` 拉取音频）
pub const SV_INIT_FLAG_USER_AUDIO_CALLBACK: u32 = 1 << 1;
pub const SV_INIT_FLAG_AUDIO_INT16: u32 = 1 << 2;
pub const SV_INIT_FLAG_AUDIO_FLOAT32: u32 = 1 << 3;
/// 音频回调与修改歌曲的函数在同一线程
pub const SV_INIT_FLAG_ONE_THREAD: u32 = 1 << 4;

// sv_get_module_flags 返回值
pub const SV_MODULE_FLAG_EXISTS: u32 = 1;
pub const SV_MODULE_FLAG_EFFECT: u32 = 2;
pub const SV_MODULE_INPUTS_OFF: u32 = 16;
pub const SV_MODULE_INPUTS_MASK: u32 = 255 << SV_MODULE_INPUTS_OFF;
pub const SV_MODULE_OUTPUTS_OFF: u32 = 16 + 8;
pub const SV_MODULE_OUTPUTS_MASK: u32 = 255 << SV_MODULE_OUTPUTS_OFF;

// sv_get_sample_type 返回值
pub const SV_STYPE_INT16: i32 = 0;
pub const SV_STYPE_INT32: i32 = 1;
pub const SV_STYPE_FLOAT32: i32 = 2;
pub const SV_STYPE_FLOAT64: i32 = 3;

/// `sv_init` 标志位集合
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InitFlags(u32);

impl InitFlags {
    pub const NONE: InitFlags = InitFlags(0);
    pub const NO_DEBUG_OUTPUT: InitFlags = InitFlags(SV_INIT_FLAG_NO_DEBUG_OUTPUT);
    pub const USER_AUDIO_CALLBACK: InitFlags = InitFlags(SV_INIT_FLAG_USER_AUDIO_CALLBACK);
    pub const AUDIO_INT16: InitFlags = InitFlags(SV_INIT_FLAG_AUDIO_INT16);
    pub const AUDIO_FLOAT32: InitFlags = InitFlags(SV_INIT_FLAG_AUDIO_FLOAT32);
    pub const ONE_THREAD: InitFlags = InitFlags(SV_INIT_FLAG_ONE_THREAD);

    /// 从原始位构造，未知位原样保留
    pub const fn from_bits(bits: u32) -> Self {
        InitFlags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: InitFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for InitFlags {
    type Output = InitFlags;

    fn bitor(self, rhs: InitFlags) -> InitFlags {
        InitFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for InitFlags {
    fn bitor_assign(&mut self, rhs: InitFlags) {
        self.0 |= rhs.0;
    }
}

/// 配置文件中使用的标志名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitFlagName {
    NoDebugOutput,
    UserAudioCallback,
    AudioInt16,
    AudioFloat32,
    OneThread,
}

impl From<InitFlagName> for InitFlags {
    fn from(name: InitFlagName) -> Self {
        match name {
            InitFlagName::NoDebugOutput => InitFlags::NO_DEBUG_OUTPUT,
            InitFlagName::UserAudioCallback => InitFlags::USER_AUDIO_CALLBACK,
            InitFlagName::AudioInt16 => InitFlags::AUDIO_INT16,
            InitFlagName::AudioFloat32 => InitFlags::AUDIO_FLOAT32,
            InitFlagName::OneThread => InitFlags::ONE_THREAD,
        }
    }
}

impl FromIterator<InitFlagName> for InitFlags {
    fn from_iter<I: IntoIterator<Item = InitFlagName>>(iter: I) -> Self {
        iter.into_iter()
            .fold(InitFlags::NONE, |acc, name| acc | InitFlags::from(name))
    }
}

/// `sv_get_module_flags` 返回的打包位域
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModuleFlags(pub u32);

impl ModuleFlags {
    pub const fn exists(self) -> bool {
        self.0 & SV_MODULE_FLAG_EXISTS != 0
    }

    pub const fn is_effect(self) -> bool {
        self.0 & SV_MODULE_FLAG_EFFECT != 0
    }

    /// 输入连接数
    pub const fn inputs(self) -> u32 {
        (self.0 & SV_MODULE_INPUTS_MASK) >> SV_MODULE_INPUTS_OFF
    }

    /// 输出连接数
    pub const fn outputs(self) -> u32 {
        (self.0 & SV_MODULE_OUTPUTS_MASK) >> SV_MODULE_OUTPUTS_OFF
    }
}

impl From<u32> for ModuleFlags {
    fn from(raw: u32) -> Self {
        ModuleFlags(raw)
    }
}

/// 引擎输出的采样格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    Int16,
    Int32,
    Float32,
    Float64,
}

impl SampleType {
    pub const fn code(self) -> i32 {
        match self {
            SampleType::Int16 => SV_STYPE_INT16,
            SampleType::Int32 => SV_STYPE_INT32,
            SampleType::Float32 => SV_STYPE_FLOAT32,
            SampleType::Float64 => SV_STYPE_FLOAT64,
        }
    }

    /// 单个采样的字节数
    pub const fn byte_width(self) -> usize {
        match self {
            SampleType::Int16 => 2,
            SampleType::Int32 | SampleType::Float32 => 4,
            SampleType::Float64 => 8,
        }
    }
}

impl TryFrom<i32> for SampleType {
    type Error = i32;

    /// 未知编码原样返回
    fn try_from(code: i32) -> Result<Self, i32> {
        match code {
            SV_STYPE_INT16 => Ok(SampleType::Int16),
            SV_STYPE_INT32 => Ok(SampleType::Int32),
            SV_STYPE_FLOAT32 => Ok(SampleType::Float32),
            SV_STYPE_FLOAT64 => Ok(SampleType::Float64),
            other => Err(other),
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleType::Int16 => "int16",
            SampleType::Int32 => "int32",
            SampleType::Float32 => "float32",
            SampleType::Float64 => "float64",
        };
        f.write_str(name)
    }
}

/// 拆分 `sv_get_module_xy`：低 16 位为 x，高 16 位为 y（均为有符号）
pub const fn unpack_module_xy(xy: u32) -> (i32, i32) {
    let x = (xy & 0xFFFF) as u16 as i16 as i32;
    let y = ((xy >> 16) & 0xFFFF) as u16 as i16 as i32;
    (x, y)
}

/// 拆分 `sv_get_module_color` 的 0xBBGGRR
pub const fn unpack_color(color: i32) -> (u8, u8, u8) {
    let raw = color as u32;
    ((raw & 0xFF) as u8, ((raw >> 8) & 0xFF) as u8, ((raw >> 16) & 0xFF) as u8)
}
