//! IBM ROMP CPU interpreter.
//!
//! The ROMP is the 32-bit processor of the IBM RT PC. It has sixteen general
//! registers, sixteen system control registers, halfword-aligned
//! instructions of two or four bytes, and "with execute" branches that run
//! the following instruction in a delay slot before transferring control.

mod cpu;
mod decode;
mod exceptions;
mod execute;
pub mod flags;
mod registers;

pub use cpu::{Flow, Romp, RompState};
pub use decode::Op;
pub use registers::{Registers, ics, irb, mpcs, scr};
