//! 引擎导出函数表
//!
//! 每个字段按导出符号命名，类型为对应的 C 函数指针。
//! 函数表只能通过 [`FunctionTable::bind`] 从符号源整体构造：任何一个符号缺失，
//! 整个绑定失败，不存在部分可用的函数表。

use std::ffi::{c_char, c_int, c_short, c_uint, c_void};

use crate::core::{BindingError, BindingResult};
use crate::ffi::NoteEvent;
use crate::loader::SymbolSource;

macro_rules! function_table {
    ($(
        $(#[$meta:meta])*
        fn $name:ident($($arg:ident: $ty:ty),* $(,)?) -> $ret:ty;
    )*) => {
        /// 已绑定的引擎函数指针
        ///
        /// 指针只在所属 `SunVox` 句柄存活期间有效。
        pub struct FunctionTable {
            $(
                $(#[$meta])*
                pub $name: unsafe extern "C" fn($($arg: $ty),*) -> $ret,
            )*
        }

        impl FunctionTable {
            /// 所有导出符号名，按声明顺序
            pub const SYMBOLS: &'static [&'static str] = &[$(stringify!($name)),*];

            /// 从符号源解析全部函数
            ///
            /// # Safety
            ///
            /// 符号源导出的函数必须具有此处声明的签名，且符号源必须比函数表活得更久。
            pub unsafe fn bind(source: &dyn SymbolSource) -> BindingResult<Self> {
                Ok(Self {
                    $(
                        $name: {
                            let address = resolve(source, stringify!($name))?;
                            std::mem::transmute::<
                                *const c_void,
                                unsafe extern "C" fn($($arg: $ty),*) -> $ret,
                            >(address)
                        },
                    )*
                })
            }
        }

        impl std::fmt::Debug for FunctionTable {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct("FunctionTable")
                    $(.field(stringify!($name), &(self.$name as *const c_void)))*
                    .finish()
            }
        }
    };
}

unsafe fn resolve(source: &dyn SymbolSource, name: &str) -> BindingResult<*const c_void> {
    let address = source.symbol(name).map_err(|reason| BindingError::Symbol {
        name: name.to_string(),
        reason,
    })?;
    if address.is_null() {
        return Err(BindingError::Symbol {
            name: name.to_string(),
            reason: "symbol resolved to a null address".to_string(),
        });
    }
    tracing::trace!(target: "sunvox", "Bound {} at {:p}", name, address);
    Ok(address)
}

function_table! {
    /// 由调用方驱动的音频回调，`buf` 的采样格式取决于初始化标志
    fn sv_audio_callback(
        buf: *mut c_void,
        frames: c_int,
        latency: c_int,
        out_time: c_uint,
    ) -> c_int;
    fn sv_open_slot(slot: c_int) -> c_int;
    fn sv_close_slot(slot: c_int) -> c_int;
    fn sv_lock_slot(slot: c_int) -> c_int;
    fn sv_unlock_slot(slot: c_int) -> c_int;
    /// 返回引擎版本号或负的错误码
    fn sv_init(config: *const c_char, freq: c_int, channels: c_int, flags: c_int) -> c_uint;
    fn sv_deinit() -> c_int;
    fn sv_get_sample_type() -> c_int;
    fn sv_load(slot: c_int, name: *const c_char) -> c_int;
    fn sv_load_from_memory(slot: c_int, data: *mut c_void, data_size: c_uint) -> c_int;
    fn sv_play(slot: c_int) -> c_int;
    fn sv_play_from_beginning(slot: c_int) -> c_int;
    fn sv_stop(slot: c_int) -> c_int;
    fn sv_set_autostop(slot: c_int, autostop: c_int) -> c_int;
    fn sv_end_of_song(slot: c_int) -> c_int;
    fn sv_rewind(slot: c_int, line_num: c_int) -> c_int;
    fn sv_volume(slot: c_int, vol: c_int) -> c_int;
    fn sv_send_event(
        slot: c_int,
        track_num: c_int,
        note: c_int,
        vel: c_int,
        module: c_int,
        ctl: c_int,
        ctl_val: c_int,
    ) -> c_int;
    fn sv_get_current_line(slot: c_int) -> c_int;
    /// 定点格式的当前行号（27.5）
    fn sv_get_current_line2(slot: c_int) -> c_int;
    fn sv_get_current_signal_level(slot: c_int, channel: c_int) -> c_int;
    fn sv_get_song_name(slot: c_int) -> *const c_char;
    fn sv_get_song_bpm(slot: c_int) -> c_int;
    fn sv_get_song_tpl(slot: c_int) -> c_int;
    fn sv_get_song_length_frames(slot: c_int) -> c_uint;
    fn sv_get_song_length_lines(slot: c_int) -> c_uint;
    fn sv_new_module(
        slot: c_int,
        module_type: *const c_char,
        name: *const c_char,
        x: c_int,
        y: c_int,
        z: c_int,
    ) -> c_int;
    fn sv_remove_module(slot: c_int, mod_num: c_int) -> c_int;
    fn sv_connect_module(slot: c_int, source: c_int, destination: c_int) -> c_int;
    fn sv_disconnect_module(slot: c_int, source: c_int, destination: c_int) -> c_int;
    fn sv_load_module(slot: c_int, file_name: *const c_char, x: c_int, y: c_int, z: c_int) -> c_int;
    fn sv_sampler_load(
        slot: c_int,
        sampler_module: c_int,
        file_name: *const c_char,
        sample_slot: c_int,
    ) -> c_int;
    fn sv_get_number_of_modules(slot: c_int) -> c_int;
    fn sv_get_module_flags(slot: c_int, mod_num: c_int) -> c_uint;
    fn sv_get_module_inputs(slot: c_int, mod_num: c_int) -> *mut c_int;
    fn sv_get_module_outputs(slot: c_int, mod_num: c_int) -> *mut c_int;
    fn sv_get_module_name(slot: c_int, mod_num: c_int) -> *const c_char;
    fn sv_get_module_xy(slot: c_int, mod_num: c_int) -> c_uint;
    fn sv_get_module_color(slot: c_int, mod_num: c_int) -> c_int;
    fn sv_get_module_scope(
        slot: c_int,
        mod_num: c_int,
        channel: c_int,
        buffer_offset: *mut c_int,
        buffer_size: *mut c_int,
    ) -> *mut c_void;
    fn sv_get_module_scope2(
        slot: c_int,
        mod_num: c_int,
        channel: c_int,
        read_buf: *mut c_short,
        samples_to_read: c_uint,
    ) -> c_uint;
    fn sv_get_number_of_module_ctls(slot: c_int, mod_num: c_int) -> c_int;
    fn sv_get_module_ctl_name(slot: c_int, mod_num: c_int, ctl_num: c_int) -> *const c_char;
    fn sv_get_module_ctl_value(slot: c_int, mod_num: c_int, ctl_num: c_int, scaled: c_int) -> c_int;
    fn sv_get_number_of_patterns(slot: c_int) -> c_int;
    fn sv_get_pattern_x(slot: c_int, pat_num: c_int) -> c_int;
    fn sv_get_pattern_y(slot: c_int, pat_num: c_int) -> c_int;
    fn sv_get_pattern_tracks(slot: c_int, pat_num: c_int) -> c_int;
    fn sv_get_pattern_lines(slot: c_int, pat_num: c_int) -> c_int;
    /// tracks × lines 个事件，按行优先排列
    fn sv_get_pattern_data(slot: c_int, pat_num: c_int) -> *mut NoteEvent;
    fn sv_pattern_mute(slot: c_int, pat_num: c_int, mute: c_int) -> c_int;
    fn sv_get_ticks() -> c_uint;
    fn sv_get_ticks_per_second() -> c_uint;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::StaticSymbols;
    use std::collections::HashSet;

    extern "C" fn placeholder() {}

    extern "C" fn fake_play(slot: c_int) -> c_int {
        slot + 100
    }

    fn complete_symbols() -> StaticSymbols {
        FunctionTable::SYMBOLS
            .iter()
            .fold(StaticSymbols::new("mock"), |symbols, name| {
                symbols.with(*name, placeholder as *const c_void)
            })
    }

    #[test]
    fn test_symbol_list() {
        assert_eq!(FunctionTable::SYMBOLS.len(), 53);
        assert_eq!(FunctionTable::SYMBOLS[0], "sv_audio_callback");
        assert!(FunctionTable::SYMBOLS.contains(&"sv_get_pattern_data"));

        let unique: HashSet<_> = FunctionTable::SYMBOLS.iter().collect();
        assert_eq!(unique.len(), FunctionTable::SYMBOLS.len());
        assert!(FunctionTable::SYMBOLS.iter().all(|name| name.starts_with("sv_")));
    }

    #[test]
    fn test_bind_complete_source() {
        let symbols = complete_symbols().with("sv_play", fake_play as *const c_void);
        let table = unsafe { FunctionTable::bind(&symbols) }.unwrap();

        assert_eq!(unsafe { (table.sv_play)(7) }, 107);
        assert_eq!(table.sv_stop as *const c_void, placeholder as *const c_void);
    }

    #[test]
    fn test_bind_fails_on_missing_export() {
        let symbols = complete_symbols().without("sv_get_module_scope2");
        let err = unsafe { FunctionTable::bind(&symbols) }.unwrap_err();
        assert_eq!(err.missing_symbol(), Some("sv_get_module_scope2"));
    }

    #[test]
    fn test_bind_fails_on_null_export() {
        let symbols = complete_symbols().with("sv_get_ticks", std::ptr::null());
        let err = unsafe { FunctionTable::bind(&symbols) }.unwrap_err();
        assert_eq!(err.missing_symbol(), Some("sv_get_ticks"));
        assert!(err.to_string().contains("null"));
    }

    #[test]
    fn test_debug_lists_symbols() {
        let table = unsafe { FunctionTable::bind(&complete_symbols()) }.unwrap();
        let rendered = format!("{:?}", table);
        assert!(rendered.contains("sv_get_ticks_per_second"));
    }
}
