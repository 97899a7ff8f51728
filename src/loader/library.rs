//! 动态库加载
//!
//! `SymbolSource` 是绑定器查找导出符号的接口：
//! - `NativeLibrary` 通过 libloading 打开磁盘上的动态库
//! - `StaticSymbols` 使用进程内的符号表（静态链接的引擎或测试替身）

use std::collections::HashMap;
use std::ffi::c_void;
use std::fmt;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use crate::core::{BindingError, BindingResult};

/// 导出符号查找
pub trait SymbolSource: Send + Sync {
    /// 用于日志和错误信息的描述
    fn describe(&self) -> String;

    /// 查找导出符号的地址
    ///
    /// # Safety
    ///
    /// 返回的地址只在符号源存活期间有效，调用方负责按正确的签名使用。
    unsafe fn symbol(&self, name: &str) -> Result<*const c_void, String>;
}

/// 磁盘上的动态库
pub struct NativeLibrary {
    library: Library,
    path: PathBuf,
}

impl NativeLibrary {
    /// 打开动态库
    ///
    /// 文件不存在、架构不匹配或被系统加载器拒绝时返回加载错误。
    pub fn open(path: impl AsRef<Path>) -> BindingResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BindingError::Load {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        // 加载动态库会执行库的初始化代码
        let library = unsafe { Library::new(path) }.map_err(|e| BindingError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        tracing::info!(target: "sunvox", "Loaded library {}", path.display());

        Ok(Self {
            library,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SymbolSource for NativeLibrary {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    unsafe fn symbol(&self, name: &str) -> Result<*const c_void, String> {
        let symbol: Symbol<unsafe extern "C" fn()> = self
            .library
            .get(name.as_bytes())
            .map_err(|e| e.to_string())?;
        Ok(*symbol as *const c_void)
    }
}

impl fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("path", &self.path)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct SymbolAddress(*const c_void);

// 地址只作为不可变数据保存，从不通过它写入
unsafe impl Send for SymbolAddress {}
unsafe impl Sync for SymbolAddress {}

/// 进程内符号表
///
/// 用于静态链接引擎的目标（例如 iOS），也用于在测试中构造替身库。
#[derive(Debug, Clone, Default)]
pub struct StaticSymbols {
    label: String,
    symbols: HashMap<String, SymbolAddress>,
}

impl StaticSymbols {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            symbols: HashMap::new(),
        }
    }

    /// 注册符号地址
    pub fn insert(&mut self, name: impl Into<String>, address: *const c_void) {
        self.symbols.insert(name.into(), SymbolAddress(address));
    }

    pub fn with(mut self, name: impl Into<String>, address: *const c_void) -> Self {
        self.insert(name, address);
        self
    }

    /// 移除符号，模拟缺少导出的库
    pub fn without(mut self, name: &str) -> Self {
        self.symbols.remove(name);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl SymbolSource for StaticSymbols {
    fn describe(&self) -> String {
        self.label.clone()
    }

    unsafe fn symbol(&self, name: &str) -> Result<*const c_void, String> {
        self.symbols
            .get(name)
            .map(|address| address.0)
            .ok_or_else(|| format!("symbol not exported by {}", self.label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("linux/lib_x86_64/sunvox.so");

        match NativeLibrary::open(&path) {
            Err(BindingError::Load { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected load error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_binary_is_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sunvox.so");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"definitely not a shared object").unwrap();
        drop(file);

        let err = NativeLibrary::open(&path).unwrap_err();
        assert!(matches!(err, BindingError::Load { .. }));
        assert!(err.to_string().contains("sunvox.so"));
    }

    /// 系统自带的 libm，作为真实可加载的共享库
    #[cfg(target_os = "linux")]
    fn system_libm() -> Option<PathBuf> {
        [
            "/lib/x86_64-linux-gnu/libm.so.6",
            "/usr/lib/x86_64-linux-gnu/libm.so.6",
            "/lib/aarch64-linux-gnu/libm.so.6",
            "/usr/lib/aarch64-linux-gnu/libm.so.6",
            "/lib64/libm.so.6",
            "/usr/lib64/libm.so.6",
            "/usr/lib/libm.so.6",
        ]
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_native_symbol_lookup() {
        let Some(path) = system_libm() else {
            return;
        };

        let library = NativeLibrary::open(&path).unwrap();
        assert_eq!(library.path(), path.as_path());

        let cos = unsafe { library.symbol("cos") }.unwrap();
        assert!(!cos.is_null());

        let missing = unsafe { library.symbol("sv_audio_callback") }.unwrap_err();
        assert!(!missing.is_empty());
    }

    #[test]
    fn test_static_symbols_lookup() {
        extern "C" fn marker() {}

        let symbols = StaticSymbols::new("mock").with("sv_play", marker as *const c_void);
        assert!(symbols.contains("sv_play"));
        assert_eq!(symbols.len(), 1);

        let found = unsafe { symbols.symbol("sv_play") }.unwrap();
        assert_eq!(found, marker as *const c_void);

        let missing = unsafe { symbols.symbol("sv_stop") }.unwrap_err();
        assert!(missing.contains("mock"));

        assert!(symbols.without("sv_play").is_empty());
    }
}
