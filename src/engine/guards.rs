//! 作用域守卫
//!
//! 成对的引擎调用（init/deinit、open/close、lock/unlock）用守卫包装，
//! 释放调用在 `Drop` 中执行，也可以显式调用以拿到返回码。
//! 守卫保存获取调用的原始返回码，不做任何解释。

use std::ffi::{c_int, c_uint};

use super::SunVox;
use crate::config::EngineConfig;
use crate::core::{BindingError, BindingResult};

/// `sv_init` 到 `sv_deinit` 之间的引擎会话
#[derive(Debug)]
pub struct EngineSession<'a> {
    sunvox: &'a SunVox,
    status: c_uint,
    released: bool,
}

impl SunVox {
    /// 按配置初始化引擎
    ///
    /// 只有配置本身无效时返回错误；引擎的返回码保存在会话中。
    pub fn init_engine(&self, config: &EngineConfig) -> BindingResult<EngineSession<'_>> {
        config.validate()?;
        let config_string = config.config_cstring()?;
        let freq = to_c_int(config.sample_rate, "sample_rate")?;
        let channels = to_c_int(config.channels, "channels")?;
        let flags = config.init_flags().bits() as c_int;

        let status = self.init(config_string.as_deref(), freq, channels, flags);
        tracing::info!(
            target: "sunvox",
            "sv_init({} Hz, {} ch, flags {:#x}) -> {}",
            freq,
            channels,
            flags,
            status as c_int
        );

        Ok(EngineSession {
            sunvox: self,
            status,
            released: false,
        })
    }

    /// 打开 slot，守卫释放时关闭
    pub fn open(&self, slot: c_int) -> SlotGuard<'_> {
        let status = self.open_slot(slot);
        tracing::debug!(target: "sunvox", "sv_open_slot({}) -> {}", slot, status);
        SlotGuard {
            sunvox: self,
            slot,
            status,
            released: false,
        }
    }

    /// 锁定 slot，守卫释放时解锁
    ///
    /// 引擎音频线程运行时，修改 slot 的调用应在锁内进行。
    pub fn lock(&self, slot: c_int) -> SlotLock<'_> {
        let status = self.lock_slot(slot);
        tracing::debug!(target: "sunvox", "sv_lock_slot({}) -> {}", slot, status);
        SlotLock {
            sunvox: self,
            slot,
            status,
            released: false,
        }
    }
}

impl<'a> EngineSession<'a> {
    /// `sv_init` 的原始返回值
    pub fn status(&self) -> c_uint {
        self.status
    }

    /// 版本号 (major, minor, patch)；返回值为负时为 `None`
    pub fn version(&self) -> Option<(u8, u8, u8)> {
        let signed = self.status as c_int;
        (signed >= 0).then(|| {
            (
                ((self.status >> 16) & 0xFF) as u8,
                ((self.status >> 8) & 0xFF) as u8,
                (self.status & 0xFF) as u8,
            )
        })
    }

    pub fn sunvox(&self) -> &'a SunVox {
        self.sunvox
    }

    /// 显式结束会话，返回 `sv_deinit` 的结果
    pub fn deinit(mut self) -> c_int {
        self.release()
    }

    fn release(&mut self) -> c_int {
        self.released = true;
        let result = self.sunvox.deinit();
        tracing::debug!(target: "sunvox", "sv_deinit() -> {}", result);
        result
    }
}

impl Drop for EngineSession<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.release();
        }
    }
}

/// 已打开的 slot
#[derive(Debug)]
pub struct SlotGuard<'a> {
    sunvox: &'a SunVox,
    slot: c_int,
    status: c_int,
    released: bool,
}

impl<'a> SlotGuard<'a> {
    pub fn slot(&self) -> c_int {
        self.slot
    }

    /// `sv_open_slot` 的原始返回值
    pub fn status(&self) -> c_int {
        self.status
    }

    pub fn sunvox(&self) -> &'a SunVox {
        self.sunvox
    }

    /// 在此 slot 上加锁
    pub fn lock(&self) -> SlotLock<'a> {
        self.sunvox.lock(self.slot)
    }

    /// 显式关闭，返回 `sv_close_slot` 的结果
    pub fn close(mut self) -> c_int {
        self.release()
    }

    fn release(&mut self) -> c_int {
        self.released = true;
        let result = self.sunvox.close_slot(self.slot);
        tracing::debug!(target: "sunvox", "sv_close_slot({}) -> {}", self.slot, result);
        result
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.release();
        }
    }
}

/// 持有中的 slot 锁
#[derive(Debug)]
pub struct SlotLock<'a> {
    sunvox: &'a SunVox,
    slot: c_int,
    status: c_int,
    released: bool,
}

impl SlotLock<'_> {
    pub fn slot(&self) -> c_int {
        self.slot
    }

    /// `sv_lock_slot` 的原始返回值
    pub fn status(&self) -> c_int {
        self.status
    }

    /// 显式解锁，返回 `sv_unlock_slot` 的结果
    pub fn unlock(mut self) -> c_int {
        self.release()
    }

    fn release(&mut self) -> c_int {
        self.released = true;
        let result = self.sunvox.unlock_slot(self.slot);
        tracing::debug!(target: "sunvox", "sv_unlock_slot({}) -> {}", self.slot, result);
        result
    }
}

impl Drop for SlotLock<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.release();
        }
    }
}

fn to_c_int(value: u32, field: &str) -> BindingResult<c_int> {
    c_int::try_from(value)
        .map_err(|_| BindingError::Marshal(format!("{} = {} does not fit in c_int", field, value)))
}
