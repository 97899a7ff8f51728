//! 模式数据访问基准测试
//!
//! 通过进程内符号表测量函数表调用与模式视图读取的开销

use std::ffi::{c_int, c_void};
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use sunvox_binding::{FunctionTable, ModuleFlags, NoteEvent, StaticSymbols, SunVox};

const TRACKS: c_int = 16;
const LINES: c_int = 256;
const CELLS: usize = (TRACKS * LINES) as usize;

static PATTERN: [NoteEvent; CELLS] = [NoteEvent::new(60, 129, 1, 0, 0); CELLS];

extern "C" fn unused() {}

extern "C" fn tracks(_slot: c_int, _pat_num: c_int) -> c_int {
    TRACKS
}

extern "C" fn lines(_slot: c_int, _pat_num: c_int) -> c_int {
    LINES
}

extern "C" fn data(_slot: c_int, _pat_num: c_int) -> *mut NoteEvent {
    PATTERN.as_ptr() as *mut NoteEvent
}

fn bench_sunvox() -> SunVox {
    let symbols = FunctionTable::SYMBOLS
        .iter()
        .fold(StaticSymbols::new("bench"), |symbols, name| {
            symbols.with(*name, unused as *const c_void)
        })
        .with("sv_get_pattern_tracks", tracks as *const c_void)
        .with("sv_get_pattern_lines", lines as *const c_void)
        .with("sv_get_pattern_data", data as *const c_void);
    unsafe { SunVox::from_source(symbols) }.expect("bench symbols are complete")
}

fn bench_pattern_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_access");
    let sunvox = bench_sunvox();

    group.bench_function("view", |b| {
        b.iter(|| black_box(sunvox.pattern_data(black_box(0), black_box(0)).map(|v| v.len())));
    });

    group.bench_function("scan_notes", |b| {
        b.iter(|| {
            let view = sunvox.pattern_data(0, 0).expect("pattern present");
            let cells = unsafe { view.as_slice() };
            black_box(cells.iter().filter(|cell| !cell.is_empty()).count())
        });
    });

    group.bench_function("cast_bytes", |b| {
        b.iter(|| {
            let bytes: &[u8] = bytemuck::cast_slice(black_box(&PATTERN[..]));
            black_box(bytes.len())
        });
    });

    group.finish();
}

fn bench_module_flags(c: &mut Criterion) {
    let raw: Vec<u32> = (0..1024u32).map(|i| i.wrapping_mul(0x9E37_79B9)).collect();

    c.bench_function("module_flags_decode", |b| {
        b.iter(|| {
            raw.iter()
                .map(|&r| {
                    let flags = ModuleFlags(r);
                    flags.inputs() + flags.outputs()
                })
                .sum::<u32>()
        });
    });
}

criterion_group!(benches, bench_pattern_access, bench_module_flags);
criterion_main!(benches);
