//! 音符事件记录
//!
//! 引擎在模式数据和事件接口中使用的固定布局结构体。
//! 布局由引擎的二进制接口决定，不能重排、加宽或重新打包。

use bytemuck::{Pod, Zeroable};

/// 音符事件（8 字节，字段顺序与引擎一致）
///
/// `Pod` 派生会拒绝任何编译器插入的填充，因此 `padding` 字段必须显式存在。
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct NoteEvent {
    /// 音高或命令码（见 `NOTECMD_*`）
    pub note: u8,
    /// 力度
    pub velocity: u8,
    /// 目标模块索引
    pub module: u8,
    /// 对齐用，未使用
    pub padding: u8,
    /// 控制器选择码
    pub controller: u16,
    /// 控制器值
    pub controller_value: u16,
}

const _: () = {
    assert!(std::mem::size_of::<NoteEvent>() == 8);
    assert!(std::mem::align_of::<NoteEvent>() == 2);
    assert!(std::mem::offset_of!(NoteEvent, note) == 0);
    assert!(std::mem::offset_of!(NoteEvent, velocity) == 1);
    assert!(std::mem::offset_of!(NoteEvent, module) == 2);
    assert!(std::mem::offset_of!(NoteEvent, padding) == 3);
    assert!(std::mem::offset_of!(NoteEvent, controller) == 4);
    assert!(std::mem::offset_of!(NoteEvent, controller_value) == 6);
};

impl NoteEvent {
    /// 记录大小（字节）
    pub const SIZE: usize = std::mem::size_of::<NoteEvent>();

    /// 创建事件，`padding` 置零
    pub const fn new(
        note: u8,
        velocity: u8,
        module: u8,
        controller: u16,
        controller_value: u16,
    ) -> Self {
        Self {
            note,
            velocity,
            module,
            padding: 0,
            controller,
            controller_value,
        }
    }

    /// 所有字段为零时表示空单元格
    pub fn is_empty(&self) -> bool {
        *self == Self::zeroed()
    }

    /// 按本机字节序的原始字节
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// 从 8 个字节读取（本机字节序）
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        bytemuck::cast(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_layout() {
        assert_eq!(NoteEvent::SIZE, 8);
        assert_eq!(std::mem::size_of::<[NoteEvent; 16]>(), 128);
    }

    #[test]
    fn test_known_bytes() {
        let event = NoteEvent::new(60, 129, 3, 0x0102, 0x8000);
        let bytes = event.as_bytes();

        assert_eq!(bytes[0], 60);
        assert_eq!(bytes[1], 129);
        assert_eq!(bytes[2], 3);
        assert_eq!(bytes[3], 0);
        assert_eq!(&bytes[4..6], &0x0102u16.to_ne_bytes());
        assert_eq!(&bytes[6..8], &0x8000u16.to_ne_bytes());
    }

    #[test]
    fn test_from_raw_bytes() {
        let mut raw = [0u8; 8];
        raw[0] = 128;
        raw[1] = 64;
        raw[2] = 7;
        raw[3] = 0xAA;
        raw[4..6].copy_from_slice(&0x0300u16.to_ne_bytes());
        raw[6..8].copy_from_slice(&0xFFFFu16.to_ne_bytes());

        let event = NoteEvent::from_bytes(raw);
        assert_eq!(event.note, 128);
        assert_eq!(event.velocity, 64);
        assert_eq!(event.module, 7);
        assert_eq!(event.padding, 0xAA);
        assert_eq!(event.controller, 0x0300);
        assert_eq!(event.controller_value, 0xFFFF);
    }

    #[test]
    fn test_empty_cell() {
        assert!(NoteEvent::default().is_empty());
        assert!(!NoteEvent::new(0, 0, 0, 0, 1).is_empty());
    }

    #[test]
    fn test_pattern_slice_cast() {
        let cells = [
            NoteEvent::new(1, 2, 3, 4, 5),
            NoteEvent::new(6, 7, 8, 9, 10),
        ];
        let bytes: &[u8] = bytemuck::cast_slice(&cells);
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[8], 6);

        let back: &[NoteEvent] = bytemuck::cast_slice(bytes);
        assert_eq!(back, &cells);
    }

    proptest! {
        #[test]
        fn fields_survive_byte_round_trip(
            note in any::<u8>(),
            velocity in any::<u8>(),
            module in any::<u8>(),
            padding in any::<u8>(),
            controller in any::<u16>(),
            controller_value in any::<u16>()
        ) {
            let event = NoteEvent { note, velocity, module, padding, controller, controller_value };
            let mut raw = [0u8; 8];
            raw.copy_from_slice(event.as_bytes());
            let back = NoteEvent::from_bytes(raw);

            prop_assert_eq!(back.note, note);
            prop_assert_eq!(back.velocity, velocity);
            prop_assert_eq!(back.module, module);
            prop_assert_eq!(back.padding, padding);
            prop_assert_eq!(back.controller, controller);
            prop_assert_eq!(back.controller_value, controller_value);
        }
    }
}
