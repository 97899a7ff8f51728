use std::ffi::CString;

use sunvox_binding::{
    init_logging, BindingConfig, BindingError, BindingResult, FunctionTable, SampleType, SunVox,
};

const USAGE: &str = "usage: sunvox-probe [--init] [song.sunvox]";

fn main() {
    let mut init = false;
    let mut song = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--init" => init = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return;
            }
            _ => song = Some(arg),
        }
    }

    let mut config = BindingConfig::load_or_default();
    config.apply_env_overrides();
    init_logging(&config.logging);

    if let Err(e) = run(&config, init || song.is_some(), song.as_deref()) {
        eprintln!("sunvox-probe failed: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &BindingConfig, init: bool, song: Option<&str>) -> BindingResult<()> {
    config.validate()?;
    let sunvox = SunVox::from_config(&config.library)?;
    println!("library: {}", sunvox.source());
    println!("functions bound: {}", FunctionTable::SYMBOLS.len());

    if !init {
        sunvox.close();
        return Ok(());
    }

    // 探测时不打开声卡，由调用方驱动音频
    let session = sunvox.init_engine(&config.engine.to_offline())?;
    match session.version() {
        Some((major, minor, patch)) => println!("engine version: {}.{}.{}", major, minor, patch),
        None => println!("sv_init failed: {}", session.status() as i32),
    }
    match SampleType::try_from(sunvox.sample_type()) {
        Ok(sample_type) => println!("sample type: {}", sample_type),
        Err(code) => println!("sample type: unknown ({})", code),
    }
    println!("ticks per second: {}", sunvox.ticks_per_second());

    if let Some(path) = song {
        let path = CString::new(path)
            .map_err(|_| BindingError::Marshal("song path contains NUL".to_string()))?;
        let slot = sunvox.open(0);
        let status = sunvox.load_song(slot.slot(), &path);
        println!("sv_load: {}", status);

        if let Some(name) = sunvox.song_name(slot.slot()) {
            println!("name: {}", unsafe { name.to_string_lossy() });
        }
        println!("bpm: {}", sunvox.song_bpm(slot.slot()));
        println!("tpl: {}", sunvox.song_tpl(slot.slot()));
        println!(
            "length: {} lines, {} frames",
            sunvox.song_length_lines(slot.slot()),
            sunvox.song_length_frames(slot.slot())
        );
        println!("modules: {}", sunvox.number_of_modules(slot.slot()));
        println!("patterns: {}", sunvox.number_of_patterns(slot.slot()));
        slot.close();
    }

    session.deinit();
    Ok(())
}
