//! A CHIP-8 virtual machine core plus a terminal front end.
//!
//! The core ([Chip8]) is a deterministic instruction interpreter with no I/O
//! of its own: the host loads a program, calls [Chip8::step] per emulated
//! instruction and [Chip8::tick_timers] at a fixed cadence, feeds key state
//! in, and reads the framebuffer out. [emulator::Emulator] is one such host,
//! rendering to the terminal through ratatui.

pub mod chip8;
pub mod display;
pub mod emulator;
pub mod error;
pub mod instruction;
pub mod state;

pub use chip8::Chip8;
