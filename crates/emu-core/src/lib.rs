//! Core traits and types shared by the interpreter cores.
//!
//! A core owns its registers and nothing else. Memory lives behind [`Bus`],
//! time is metered through [`CycleBudget`], and every piece of architectural
//! state is reachable through [`Observable`].

mod budget;
mod bus;
mod cpu;
mod dispatch;
mod observable;

pub use budget::CycleBudget;
pub use bus::{AddressSpace, Bus, MemoryBus};
pub use cpu::{Cpu, LineState};
pub use dispatch::{OpcodeEntry, OpcodeTable};
pub use observable::{Observable, StateError, Value};
