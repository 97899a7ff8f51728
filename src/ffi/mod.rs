//! 引擎二进制接口
//!
//! - `types` - 音符事件记录
//! - `constants` - 命令码、标志位和采样类型
//! - `functions` - 导出函数表
//! - `view` - 引擎内存的只读视图

pub mod constants;
pub mod functions;
pub mod types;
pub mod view;

pub use constants::*;
pub use functions::FunctionTable;
pub use types::NoteEvent;
pub use view::{ForeignSlice, ForeignStr, ScopeView};
