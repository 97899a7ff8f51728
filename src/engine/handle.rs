//! 引擎句柄
//!
//! `SunVox` 拥有已加载的库和绑定好的函数表。句柄由调用方显式创建和释放，
//! 没有进程级单例，同一进程中可以存在多个互不影响的句柄。
//!
//! 所有调用都原样转发参数、原样返回引擎的返回码：
//! slot 和模块编号不做范围检查，负的错误码也不做解释。

use std::ffi::{c_int, c_short, c_uint, c_void, CStr};
use std::fmt;
use std::path::Path;

use crate::config::LibraryConfig;
use crate::core::{BindingError, BindingResult};
use crate::ffi::{
    ForeignSlice, ForeignStr, FunctionTable, ModuleFlags, NoteEvent, ScopeView,
};
use crate::loader::{NativeLibrary, Platform, SymbolSource};

/// 已绑定的引擎
pub struct SunVox {
    // 函数表先于库释放
    functions: FunctionTable,
    source: Box<dyn SymbolSource>,
}

impl SunVox {
    /// 加载指定路径的引擎库并绑定全部符号
    pub fn load(path: impl AsRef<Path>) -> BindingResult<Self> {
        let library = NativeLibrary::open(path.as_ref()).inspect_err(|e| {
            tracing::error!(target: "sunvox", "{}", e);
        })?;
        // 库文件由调用方指定，视为真正的引擎库
        unsafe { Self::from_source(library) }
    }

    /// 按平台在库根目录下查找并加载
    pub fn load_platform(root: impl AsRef<Path>, platform: Platform) -> BindingResult<Self> {
        tracing::debug!(target: "sunvox", "Resolving library for {}", platform);
        Self::load(platform.library_path(root))
    }

    /// 根据配置加载
    pub fn from_config(config: &LibraryConfig) -> BindingResult<Self> {
        config.validate()?;
        Self::load(config.resolve_path()?)
    }

    /// 从任意符号源绑定
    ///
    /// # Safety
    ///
    /// 符号源中每个 `sv_*` 地址都必须是签名与 [`FunctionTable`] 一致的函数。
    pub unsafe fn from_source<S: SymbolSource + 'static>(source: S) -> BindingResult<Self> {
        let functions = FunctionTable::bind(&source).inspect_err(|e| {
            tracing::error!(target: "sunvox", "{} ({})", e, source.describe());
        })?;
        tracing::info!(
            target: "sunvox",
            "Bound {} engine functions from {}",
            FunctionTable::SYMBOLS.len(),
            source.describe()
        );
        Ok(Self {
            functions,
            source: Box::new(source),
        })
    }

    /// 原始函数表
    ///
    /// 复制出的函数指针不能在句柄释放后使用。
    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// 符号源描述（库路径或符号表名）
    pub fn source(&self) -> String {
        self.source.describe()
    }

    /// 显式释放句柄并卸载库
    pub fn close(self) {
        tracing::debug!(target: "sunvox", "Releasing {}", self.source.describe());
    }

    // ---- 音频输出 ----

    /// 拉取 `frames` 帧音频到 `buf`
    ///
    /// # Safety
    ///
    /// `buf` 至少要容纳 `frames × 声道数` 个采样，采样格式由初始化标志决定。
    pub unsafe fn audio_callback(
        &self,
        buf: *mut c_void,
        frames: c_int,
        latency: c_int,
        out_time: c_uint,
    ) -> c_int {
        (self.functions.sv_audio_callback)(buf, frames, latency, out_time)
    }

    // ---- 全局 ----

    /// `config` 为 `None` 时传空指针
    pub fn init(
        &self,
        config: Option<&CStr>,
        freq: c_int,
        channels: c_int,
        flags: c_int,
    ) -> c_uint {
        let config = config.map_or(std::ptr::null(), CStr::as_ptr);
        unsafe { (self.functions.sv_init)(config, freq, channels, flags) }
    }

    pub fn deinit(&self) -> c_int {
        unsafe { (self.functions.sv_deinit)() }
    }

    /// 原始采样类型编码，见 `SampleType`
    pub fn sample_type(&self) -> c_int {
        unsafe { (self.functions.sv_get_sample_type)() }
    }

    pub fn ticks(&self) -> c_uint {
        unsafe { (self.functions.sv_get_ticks)() }
    }

    pub fn ticks_per_second(&self) -> c_uint {
        unsafe { (self.functions.sv_get_ticks_per_second)() }
    }

    // ---- Slot ----

    pub fn open_slot(&self, slot: c_int) -> c_int {
        unsafe { (self.functions.sv_open_slot)(slot) }
    }

    pub fn close_slot(&self, slot: c_int) -> c_int {
        unsafe { (self.functions.sv_close_slot)(slot) }
    }

    pub fn lock_slot(&self, slot: c_int) -> c_int {
        unsafe { (self.functions.sv_lock_slot)(slot) }
    }

    pub fn unlock_slot(&self, slot: c_int) -> c_int {
        unsafe { (self.functions.sv_unlock_slot)(slot) }
    }

    // ---- 歌曲与播放 ----

    pub fn load_song(&self, slot: c_int, name: &CStr) -> c_int {
        unsafe { (self.functions.sv_load)(slot, name.as_ptr()) }
    }

    /// 从内存加载歌曲，引擎只读取 `data`
    pub fn load_from_memory(&self, slot: c_int, data: &[u8]) -> BindingResult<c_int> {
        let size = buffer_len(data.len())?;
        let data = data.as_ptr() as *mut c_void;
        Ok(unsafe { (self.functions.sv_load_from_memory)(slot, data, size) })
    }

    pub fn play(&self, slot: c_int) -> c_int {
        unsafe { (self.functions.sv_play)(slot) }
    }

    pub fn play_from_beginning(&self, slot: c_int) -> c_int {
        unsafe { (self.functions.sv_play_from_beginning)(slot) }
    }

    pub fn stop(&self, slot: c_int) -> c_int {
        unsafe { (self.functions.sv_stop)(slot) }
    }

    pub fn set_autostop(&self, slot: c_int, autostop: c_int) -> c_int {
        unsafe { (self.functions.sv_set_autostop)(slot, autostop) }
    }

    pub fn end_of_song(&self, slot: c_int) -> c_int {
        unsafe { (self.functions.sv_end_of_song)(slot) }
    }

    pub fn rewind(&self, slot: c_int, line_num: c_int) -> c_int {
        unsafe { (self.functions.sv_rewind)(slot, line_num) }
    }

    pub fn volume(&self, slot: c_int, vol: c_int) -> c_int {
        unsafe { (self.functions.sv_volume)(slot, vol) }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn send_event(
        &self,
        slot: c_int,
        track_num: c_int,
        note: c_int,
        vel: c_int,
        module: c_int,
        ctl: c_int,
        ctl_val: c_int,
    ) -> c_int {
        unsafe { (self.functions.sv_send_event)(slot, track_num, note, vel, module, ctl, ctl_val) }
    }

    /// 以记录的字段发送事件
    pub fn send_note_event(&self, slot: c_int, track_num: c_int, event: &NoteEvent) -> c_int {
        self.send_event(
            slot,
            track_num,
            c_int::from(event.note),
            c_int::from(event.velocity),
            c_int::from(event.module),
            c_int::from(event.controller),
            c_int::from(event.controller_value),
        )
    }

    pub fn current_line(&self, slot: c_int) -> c_int {
        unsafe { (self.functions.sv_get_current_line)(slot) }
    }

    /// 定点格式（27.5）
    pub fn current_line2(&self, slot: c_int) -> c_int {
        unsafe { (self.functions.sv_get_current_line2)(slot) }
    }

    pub fn current_signal_level(&self, slot: c_int, channel: c_int) -> c_int {
        unsafe { (self.functions.sv_get_current_signal_level)(slot, channel) }
    }

    pub fn song_name(&self, slot: c_int) -> Option<ForeignStr<'_>> {
        ForeignStr::new(unsafe { (self.functions.sv_get_song_name)(slot) })
    }

    pub fn song_bpm(&self, slot: c_int) -> c_int {
        unsafe { (self.functions.sv_get_song_bpm)(slot) }
    }

    pub fn song_tpl(&self, slot: c_int) -> c_int {
        unsafe { (self.functions.sv_get_song_tpl)(slot) }
    }

    pub fn song_length_frames(&self, slot: c_int) -> c_uint {
        unsafe { (self.functions.sv_get_song_length_frames)(slot) }
    }

    pub fn song_length_lines(&self, slot: c_int) -> c_uint {
        unsafe { (self.functions.sv_get_song_length_lines)(slot) }
    }

    // ---- 模块 ----

    pub fn new_module(
        &self,
        slot: c_int,
        module_type: &CStr,
        name: &CStr,
        x: c_int,
        y: c_int,
        z: c_int,
    ) -> c_int {
        unsafe {
            (self.functions.sv_new_module)(slot, module_type.as_ptr(), name.as_ptr(), x, y, z)
        }
    }

    pub fn remove_module(&self, slot: c_int, mod_num: c_int) -> c_int {
        unsafe { (self.functions.sv_remove_module)(slot, mod_num) }
    }

    pub fn connect_module(&self, slot: c_int, source: c_int, destination: c_int) -> c_int {
        unsafe { (self.functions.sv_connect_module)(slot, source, destination) }
    }

    pub fn disconnect_module(&self, slot: c_int, source: c_int, destination: c_int) -> c_int {
        unsafe { (self.functions.sv_disconnect_module)(slot, source, destination) }
    }

    pub fn load_module(
        &self,
        slot: c_int,
        file_name: &CStr,
        x: c_int,
        y: c_int,
        z: c_int,
    ) -> c_int {
        unsafe { (self.functions.sv_load_module)(slot, file_name.as_ptr(), x, y, z) }
    }

    pub fn sampler_load(
        &self,
        slot: c_int,
        sampler_module: c_int,
        file_name: &CStr,
        sample_slot: c_int,
    ) -> c_int {
        unsafe {
            (self.functions.sv_sampler_load)(slot, sampler_module, file_name.as_ptr(), sample_slot)
        }
    }

    pub fn number_of_modules(&self, slot: c_int) -> c_int {
        unsafe { (self.functions.sv_get_number_of_modules)(slot) }
    }

    /// 原始位域，用 [`ModuleFlags`] 解码
    pub fn module_flags(&self, slot: c_int, mod_num: c_int) -> c_uint {
        unsafe { (self.functions.sv_get_module_flags)(slot, mod_num) }
    }

    /// 输入模块编号，长度取自模块标志中的输入数
    pub fn module_inputs(&self, slot: c_int, mod_num: c_int) -> Option<ForeignSlice<'_, c_int>> {
        let ptr = unsafe { (self.functions.sv_get_module_inputs)(slot, mod_num) };
        let len = ModuleFlags(self.module_flags(slot, mod_num)).inputs() as usize;
        ForeignSlice::new(ptr as *const c_int, len)
    }

    /// 输出模块编号，长度取自模块标志中的输出数
    pub fn module_outputs(&self, slot: c_int, mod_num: c_int) -> Option<ForeignSlice<'_, c_int>> {
        let ptr = unsafe { (self.functions.sv_get_module_outputs)(slot, mod_num) };
        let len = ModuleFlags(self.module_flags(slot, mod_num)).outputs() as usize;
        ForeignSlice::new(ptr as *const c_int, len)
    }

    pub fn module_name(&self, slot: c_int, mod_num: c_int) -> Option<ForeignStr<'_>> {
        ForeignStr::new(unsafe { (self.functions.sv_get_module_name)(slot, mod_num) })
    }

    /// 打包坐标，用 `unpack_module_xy` 拆分
    pub fn module_xy(&self, slot: c_int, mod_num: c_int) -> c_uint {
        unsafe { (self.functions.sv_get_module_xy)(slot, mod_num) }
    }

    /// 0xBBGGRR
    pub fn module_color(&self, slot: c_int, mod_num: c_int) -> c_int {
        unsafe { (self.functions.sv_get_module_color)(slot, mod_num) }
    }

    pub fn module_scope(
        &self,
        slot: c_int,
        mod_num: c_int,
        channel: c_int,
    ) -> Option<ScopeView<'_>> {
        let mut offset: c_int = 0;
        let mut size: c_int = 0;
        let ptr = unsafe {
            (self.functions.sv_get_module_scope)(slot, mod_num, channel, &mut offset, &mut size)
        };
        ScopeView::new(ptr, offset, size)
    }

    /// 将示波器数据复制到 `dest`，返回实际读取的采样数
    pub fn module_scope2(
        &self,
        slot: c_int,
        mod_num: c_int,
        channel: c_int,
        dest: &mut [i16],
    ) -> BindingResult<c_uint> {
        let samples = buffer_len(dest.len())?;
        Ok(unsafe {
            (self.functions.sv_get_module_scope2)(
                slot,
                mod_num,
                channel,
                dest.as_mut_ptr() as *mut c_short,
                samples,
            )
        })
    }

    pub fn number_of_module_ctls(&self, slot: c_int, mod_num: c_int) -> c_int {
        unsafe { (self.functions.sv_get_number_of_module_ctls)(slot, mod_num) }
    }

    pub fn module_ctl_name(
        &self,
        slot: c_int,
        mod_num: c_int,
        ctl_num: c_int,
    ) -> Option<ForeignStr<'_>> {
        ForeignStr::new(unsafe {
            (self.functions.sv_get_module_ctl_name)(slot, mod_num, ctl_num)
        })
    }

    pub fn module_ctl_value(
        &self,
        slot: c_int,
        mod_num: c_int,
        ctl_num: c_int,
        scaled: c_int,
    ) -> c_int {
        unsafe { (self.functions.sv_get_module_ctl_value)(slot, mod_num, ctl_num, scaled) }
    }

    // ---- 模式 ----

    pub fn number_of_patterns(&self, slot: c_int) -> c_int {
        unsafe { (self.functions.sv_get_number_of_patterns)(slot) }
    }

    pub fn pattern_x(&self, slot: c_int, pat_num: c_int) -> c_int {
        unsafe { (self.functions.sv_get_pattern_x)(slot, pat_num) }
    }

    pub fn pattern_y(&self, slot: c_int, pat_num: c_int) -> c_int {
        unsafe { (self.functions.sv_get_pattern_y)(slot, pat_num) }
    }

    pub fn pattern_tracks(&self, slot: c_int, pat_num: c_int) -> c_int {
        unsafe { (self.functions.sv_get_pattern_tracks)(slot, pat_num) }
    }

    pub fn pattern_lines(&self, slot: c_int, pat_num: c_int) -> c_int {
        unsafe { (self.functions.sv_get_pattern_lines)(slot, pat_num) }
    }

    /// 模式单元格，按行优先排列：`line * tracks + track`
    ///
    /// 长度为 tracks × lines；任一维度为负时视图为空。
    pub fn pattern_data(
        &self,
        slot: c_int,
        pat_num: c_int,
    ) -> Option<ForeignSlice<'_, NoteEvent>> {
        let ptr = unsafe { (self.functions.sv_get_pattern_data)(slot, pat_num) };
        let len = pattern_len(
            self.pattern_tracks(slot, pat_num),
            self.pattern_lines(slot, pat_num),
        );
        ForeignSlice::new(ptr as *const NoteEvent, len)
    }

    pub fn pattern_mute(&self, slot: c_int, pat_num: c_int, mute: c_int) -> c_int {
        unsafe { (self.functions.sv_pattern_mute)(slot, pat_num, mute) }
    }
}

impl fmt::Debug for SunVox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SunVox")
            .field("source", &self.source.describe())
            .field("functions", &FunctionTable::SYMBOLS.len())
            .finish()
    }
}

fn buffer_len(len: usize) -> BindingResult<c_uint> {
    c_uint::try_from(len)
        .map_err(|_| BindingError::Marshal(format!("buffer of {} elements exceeds u32", len)))
}

/// 由轨道数与行数计算音符视图的长度
///
/// 负数维度或乘积溢出时返回 0。
pub(crate) fn pattern_len(tracks: c_int, lines: c_int) -> usize {
    let tracks = usize::try_from(tracks).unwrap_or(0);
    let lines = usize::try_from(lines).unwrap_or(0);
    tracks.checked_mul(lines).unwrap_or(0)
}
