//! 引擎内存的只读视图
//!
//! 引擎返回的指针指向其内部缓冲区。绑定层不复制、不释放，也不检查边界：
//! 视图只携带指针和引擎提供的长度，读取是 `unsafe` 操作。
//!
//! # 生命周期约定
//!
//! 视图借用 `SunVox` 句柄，但这只能保证库没有被卸载。引擎可能在下一次调用
//! （尤其是同一 slot 上的调用）时复用或释放缓冲区，调用方必须在此之前读完。
//! 并发读取同样没有保证。

use std::ffi::{c_char, c_int, c_void, CStr};
use std::marker::PhantomData;

/// 引擎返回的以 NUL 结尾的字符串
#[derive(Debug, Clone, Copy)]
pub struct ForeignStr<'a> {
    ptr: *const c_char,
    _owner: PhantomData<&'a CStr>,
}

impl<'a> ForeignStr<'a> {
    /// 空指针返回 `None`
    pub(crate) fn new(ptr: *const c_char) -> Option<Self> {
        (!ptr.is_null()).then_some(Self {
            ptr,
            _owner: PhantomData,
        })
    }

    pub fn as_ptr(&self) -> *const c_char {
        self.ptr
    }

    /// # Safety
    ///
    /// 引擎缓冲区必须仍然有效（见模块文档）。
    pub unsafe fn as_c_str(&self) -> &'a CStr {
        CStr::from_ptr(self.ptr)
    }

    /// 复制为 Rust 字符串，非 UTF-8 字节被替换
    ///
    /// # Safety
    ///
    /// 同 [`ForeignStr::as_c_str`]。
    pub unsafe fn to_string_lossy(&self) -> String {
        self.as_c_str().to_string_lossy().into_owned()
    }
}

/// 引擎拥有的定长数组
#[derive(Debug, Clone, Copy)]
pub struct ForeignSlice<'a, T> {
    ptr: *const T,
    len: usize,
    _owner: PhantomData<&'a [T]>,
}

impl<'a, T: Copy> ForeignSlice<'a, T> {
    /// 空指针返回 `None`；长度来自引擎的其他查询
    pub(crate) fn new(ptr: *const T, len: usize) -> Option<Self> {
        (!ptr.is_null()).then_some(Self {
            ptr,
            len,
            _owner: PhantomData,
        })
    }

    pub fn as_ptr(&self) -> *const T {
        self.ptr
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// # Safety
    ///
    /// 引擎缓冲区必须仍然有效，且至少包含 `len` 个元素。
    pub unsafe fn as_slice(&self) -> &'a [T] {
        std::slice::from_raw_parts(self.ptr, self.len)
    }

    /// # Safety
    ///
    /// 同 [`ForeignSlice::as_slice`]。
    pub unsafe fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }
}

/// `sv_get_module_scope` 返回的示波器环形缓冲区
#[derive(Debug, Clone, Copy)]
pub struct ScopeView<'a> {
    ptr: *mut c_void,
    offset: c_int,
    size: c_int,
    _owner: PhantomData<&'a c_void>,
}

impl<'a> ScopeView<'a> {
    pub(crate) fn new(ptr: *mut c_void, offset: c_int, size: c_int) -> Option<Self> {
        (!ptr.is_null()).then_some(Self {
            ptr,
            offset,
            size,
            _owner: PhantomData,
        })
    }

    /// 缓冲区起始地址；采样格式由 `sv_get_sample_type` 决定
    pub fn as_ptr(&self) -> *mut c_void {
        self.ptr
    }

    /// 当前写入位置
    pub fn offset(&self) -> c_int {
        self.offset
    }

    /// 缓冲区长度（采样数）
    pub fn size(&self) -> c_int {
        self.size
    }

    /// 以指定采样类型解释缓冲区
    ///
    /// # Safety
    ///
    /// `T` 必须与引擎的采样格式一致，且缓冲区仍然有效。
    pub unsafe fn samples<T: Copy>(&self) -> &'a [T] {
        let len = usize::try_from(self.size).unwrap_or(0);
        std::slice::from_raw_parts(self.ptr as *const T, len)
    }
}
