//! TI TMS32025 / TMS32026 DSP interpreter.
//!
//! A Harvard-architecture 16-bit DSP with a 32-bit accumulator, a 16x16
//! multiplier, eight auxiliary registers for indirect addressing and an
//! eight-deep hardware stack. All addressing is in words; the core presents
//! byte addresses to the [`emu_core::Bus`] as the word address shifted left
//! by one.
//!
//! Both parts run on one engine parameterised by [`Model`]. They differ in
//! their on-chip RAM layout and in which RAM configuration instructions are
//! enabled.

mod addressing;
mod cpu;
mod decode;
mod execute;
mod interrupts;
mod memory;
mod model;
mod registers;
pub mod status;

pub use addressing::reverse_carry_add;
pub use cpu::{CLK, Flow, Tms32025, Tms32025State};
pub use decode::Op;
pub use interrupts::{ifr, line, vector};
pub use memory::{OnChipRam, mmr};
pub use model::{Capabilities, Model, ModelError, RamBlock};
pub use registers::Registers;
pub use status::Status;
