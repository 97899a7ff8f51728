//! 引擎模块
//!
//! - `handle` - 引擎句柄与调用封装
//! - `guards` - 成对调用的作用域守卫

pub mod guards;
pub mod handle;


pub use guards::{EngineSession, SlotGuard, SlotLock};
pub use handle::SunVox;
