//! TUI debugger for the LS-8 emulator.
//!
//! Provides an interactive terminal-based debugger with:
//! - Register and stack visualization
//! - Memory view with PC and stack highlighting
//! - Step/run/breakpoint controls
//! - Disassembly view and PRN output

mod app;
mod ui;

pub use app::{DebuggerApp, run_debugger};
