//! 平台识别与库路径解析
//!
//! 预编译库按 `<root>/<os>/lib_<arch>/sunvox.<ext>` 布局存放。

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{BindingError, BindingResult};

/// 默认库根目录
pub const DEFAULT_LIBRARY_ROOT: &str = "sunvox_dll";

/// 库文件名（不含扩展名）
pub const LIBRARY_STEM: &str = "sunvox";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Macos,
    Windows,
}

impl Os {
    pub const fn dir_name(self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Macos => "macos",
            Os::Windows => "windows",
        }
    }

    /// 动态库扩展名
    pub const fn library_extension(self) -> &'static str {
        match self {
            Os::Linux => "so",
            Os::Macos => "dylib",
            Os::Windows => "dll",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    X86,
    X86_64,
    Arm,
    Arm64,
}

impl Arch {
    pub const fn dir_name(self) -> &'static str {
        match self {
            Arch::X86 => "lib_x86",
            Arch::X86_64 => "lib_x86_64",
            Arch::Arm => "lib_arm",
            Arch::Arm64 => "lib_arm64",
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
        }
    }
}

/// 目标平台标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// 当前编译目标对应的平台
    ///
    /// 没有预编译库的目标返回 `UnsupportedPlatform`。
    pub fn current() -> BindingResult<Self> {
        Self::from_consts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// 按 `std::env::consts` 的取值映射平台
    ///
    /// 只接受与预编译库完全对应的系统，Android 等不会退回到 Linux 的库。
    pub fn from_consts(os: &str, arch: &str) -> BindingResult<Self> {
        let target_os = match os {
            "linux" => Os::Linux,
            "macos" => Os::Macos,
            "windows" => Os::Windows,
            _ => return Err(unsupported(os, arch)),
        };
        let target_arch = match arch {
            "x86" => Arch::X86,
            "x86_64" => Arch::X86_64,
            "arm" => Arch::Arm,
            "aarch64" => Arch::Arm64,
            _ => return Err(unsupported(os, arch)),
        };
        Ok(Self {
            os: target_os,
            arch: target_arch,
        })
    }

    /// 库文件相对于根目录的路径
    pub fn relative_library_path(&self) -> PathBuf {
        PathBuf::from(self.os.dir_name())
            .join(self.arch.dir_name())
            .join(format!("{}.{}", LIBRARY_STEM, self.os.library_extension()))
    }

    /// 库文件的完整路径
    pub fn library_path(&self, root: impl AsRef<Path>) -> PathBuf {
        root.as_ref().join(self.relative_library_path())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os.dir_name(), self.arch.name())
    }
}

impl FromStr for Platform {
    type Err = BindingError;

    /// 解析 `linux-x86_64`、`macos-arm64` 这类标识
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (os, arch) = s
            .split_once('-')
            .ok_or_else(|| unsupported(s, "?"))?;
        let os = match os {
            "linux" => Os::Linux,
            "macos" => Os::Macos,
            "windows" => Os::Windows,
            _ => return Err(unsupported(os, arch)),
        };
        let arch = match arch {
            "x86" => Arch::X86,
            "x86_64" => Arch::X86_64,
            "arm" => Arch::Arm,
            "arm64" | "aarch64" => Arch::Arm64,
            _ => return Err(unsupported(os.dir_name(), arch)),
        };
        Ok(Self { os, arch })
    }
}

fn unsupported(os: &str, arch: &str) -> BindingError {
    BindingError::UnsupportedPlatform {
        os: os.to_string(),
        arch: arch.to_string(),
    }
}
