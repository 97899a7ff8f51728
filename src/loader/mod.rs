//! 库加载模块
//!
//! - `platform` - 平台识别与预编译库路径
//! - `library` - 动态库打开与符号查找

pub mod library;
pub mod platform;

pub use library::{NativeLibrary, StaticSymbols, SymbolSource};
pub use platform::{Arch, Os, Platform, DEFAULT_LIBRARY_ROOT, LIBRARY_STEM};
