//! CPU core trait.

use crate::{Bus, CycleBudget};

/// Logical state of an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineState {
    /// The line is requesting service.
    Asserted,
    /// The line is idle.
    Cleared,
}

impl LineState {
    /// True when asserted.
    #[must_use]
    pub const fn is_asserted(self) -> bool {
        matches!(self, Self::Asserted)
    }
}

impl From<bool> for LineState {
    fn from(asserted: bool) -> Self {
        if asserted { Self::Asserted } else { Self::Cleared }
    }
}

/// An interpreter core.
///
/// The bus is passed in, not owned, so the host keeps full control of the
/// memory map between runs. All timing flows through the budget handed to
/// [`Cpu::run`]: the core executes whole steps until the budget is
/// exhausted and never stops in the middle of one.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Execute steps until `budget` is exhausted.
    fn run<B: Bus>(&mut self, bus: &mut B, budget: &mut CycleBudget);

    /// Reset to the power-on state. Cores that fetch their start address
    /// from memory do so through `bus`.
    fn reset<B: Bus>(&mut self, bus: &mut B);

    /// Drive an interrupt or control input line.
    fn set_input_line(&mut self, line: u8, state: LineState);

    /// Returns the current program counter.
    fn pc(&self) -> u32;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Human-readable rendering of the status flags.
    fn flags_string(&self) -> String;
}
