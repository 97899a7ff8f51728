//! # SunVox Binding
//!
//! Runtime binding for the SunVox native audio engine.
//!
//! The crate loads the prebuilt engine library for the host platform, binds every
//! exported `sv_*` function with its exact C signature, and publishes the engine's
//! constants and its one fixed-layout record ([`NoteEvent`]).
//!
//! ## Features
//!
//! - **Explicit handles**: [`SunVox`] owns the loaded library; no process-wide state
//! - **Fail-fast binding**: a missing library or export aborts with a named error
//! - **Byte-exact layout**: [`NoteEvent`] is an 8-byte `#[repr(C)]` plain-old-data record
//! - **Foreign views**: engine-owned strings and arrays are returned as borrowed views
//! - **Scoped guards**: init/deinit, open/close and lock/unlock pairs are RAII guards
//!
//! ### Example
//!
//! ```ignore
//! use sunvox_binding::{BindingConfig, EngineConfig, SunVox};
//!
//! let config = BindingConfig::load_or_default();
//! let sunvox = SunVox::from_config(&config.library)?;
//! let _engine = sunvox.init_engine(&EngineConfig::offline(44100))?;
//! let slot = sunvox.open(0);
//! sunvox.load_song(slot.slot(), c"song.sunvox");
//! sunvox.play_from_beginning(slot.slot());
//! ```
//!
//! ## Modules
//!
//! - [`ffi`]: record type, constants, function table, foreign views
//! - [`loader`]: platform resolution and symbol sources
//! - [`engine`]: the [`SunVox`] handle and its guards
//! - [`config`]: configuration files and environment overrides
//! - [`core`]: error types

/// Error types
pub mod core;
/// Engine binary interface: record layout, constants and function table
pub mod ffi;
/// Platform resolution and dynamic library loading
pub mod loader;
/// The engine handle
pub mod engine;
/// Configuration system
pub mod config;
/// Logging setup
pub mod logging;

pub use crate::config::{BindingConfig, EngineConfig, LibraryConfig, LogLevel, LoggingConfig};
pub use crate::core::{BindingError, BindingResult, ConfigError, ConfigResult};
pub use crate::engine::{EngineSession, SlotGuard, SlotLock, SunVox};
pub use crate::ffi::*;
pub use crate::loader::{Arch, NativeLibrary, Os, Platform, StaticSymbols, SymbolSource};
pub use crate::logging::init_logging;
