//! ROMP core: step loop, control-flow token and host surfaces.
//!
//! ## Control flow
//!
//! Branches never move the IAR directly. A handler latches the target and
//! sets the [`Flow`] token; the token is consumed exactly once, at the end
//! of the step:
//!
//! - `Normal`: IAR advances past the instruction.
//! - `BranchPending`: IAR takes the latched target.
//! - `DelaySlotPending`: IAR advances, and the token becomes
//!   `BranchPending` so the next instruction runs in the delay slot.
//! - `ExceptionJustEntered`: exception entry already loaded the IAR.
//!
//! A branch-class instruction found in a delay slot is a program check.

use emu_core::{AddressSpace, Bus, Cpu, CycleBudget, LineState, Observable, StateError, Value};

use crate::decode::{decode, has_extension};
use crate::flags::{self, ConditionStatus};
use crate::registers::{Registers, irb, mpcs, scr};

/// Control-flow token, consumed at the end of every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Flow {
    /// Sequential execution.
    #[default]
    Normal,
    /// A branch target is latched and takes effect at the end of this step.
    BranchPending,
    /// A branch with execute was taken; the next instruction is its delay
    /// slot.
    DelaySlotPending,
    /// Exception entry has already loaded a new IAR.
    ExceptionJustEntered,
}

impl Flow {
    const fn name(self) -> &'static str {
        match self {
            Flow::Normal => "normal",
            Flow::BranchPending => "branch",
            Flow::DelaySlotPending => "delay",
            Flow::ExceptionJustEntered => "exception",
        }
    }
}

/// Operands of the instruction being executed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Step {
    /// First halfword.
    pub op: u16,
    /// Second halfword for BI, BA and D formats; zero otherwise.
    pub ext: u16,
    /// Address of the following instruction.
    pub next: u32,
}

/// Everything needed to resume a core, for save states.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RompState {
    pub regs: Registers,
    pub flow: Flow,
    pub branch_target: u32,
    pub translate_mode: bool,
    pub pending_machine_check: Option<u32>,
    pub total_cycles: u64,
}

/// IBM ROMP CPU.
#[derive(Debug, Clone, Default)]
pub struct Romp {
    // === Registers ===
    pub regs: Registers,

    // === Control flow ===
    pub(crate) flow: Flow,
    pub(crate) branch_target: u32,

    // === Pins ===
    /// Translate-mode output, follows ICS bit 8.
    pub(crate) translate_mode: bool,
    /// Machine check status signalled by the host, taken at the next
    /// boundary.
    pending_machine_check: Option<u32>,

    // === Timing ===
    total_cycles: u64,
}

impl Romp {
    /// Create a core with every register cleared. Call [`Cpu::reset`]
    /// before running to load the start address.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current control-flow token.
    #[must_use]
    pub const fn flow(&self) -> Flow {
        self.flow
    }

    /// Latched branch target.
    #[must_use]
    pub const fn branch_target(&self) -> u32 {
        self.branch_target
    }

    /// State of the translate-mode output line.
    #[must_use]
    pub const fn translate_mode(&self) -> bool {
        self.translate_mode
    }

    /// Cycles consumed since creation.
    #[must_use]
    pub const fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Typed view of the condition status register.
    #[must_use]
    pub const fn condition(&self) -> ConditionStatus {
        ConditionStatus::new(self.regs.cs())
    }

    /// Signal a hardware-detected fault. The machine check is taken
    /// through vector 7 at the next step boundary outside a branch.
    pub fn signal_machine_check(&mut self, status: u32) {
        self.pending_machine_check = Some(status);
    }

    pub(crate) fn take_machine_check(&mut self) -> Option<u32> {
        self.pending_machine_check.take()
    }

    /// Execute one step and return the cycles it consumed.
    ///
    /// A step is either one instruction or, at a boundary with a request
    /// pending, the entry into its interrupt handler.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        if self.flow == Flow::Normal && self.service_interrupts(bus) {
            self.end_step(self.regs.iar());
            return 1;
        }

        let iar = self.regs.iar();
        let op = bus.read_u16(AddressSpace::Program, iar);
        let mut next = iar.wrapping_add(2);
        let ext = if has_extension(op) {
            let ext = bus.read_u16(AddressSpace::Program, next);
            next = next.wrapping_add(2);
            ext
        } else {
            0
        };

        let entry = decode(op);
        let mut cycles = u32::from(entry.cycles);
        if self.flow == Flow::BranchPending && entry.handler.is_branch_class() {
            self.program_check(bus, mpcs::KNOWN_ORIGIN | mpcs::ILLEGAL_OP);
        } else {
            cycles += self.execute(bus, entry.handler, Step { op, ext, next });
        }

        self.end_step(next);
        cycles
    }

    fn end_step(&mut self, next: u32) {
        match self.flow {
            Flow::Normal => self.regs.scr[scr::IAR] = next,
            Flow::BranchPending => {
                self.regs.scr[scr::IAR] = self.branch_target;
                self.flow = Flow::Normal;
            }
            Flow::DelaySlotPending => {
                self.regs.scr[scr::IAR] = next;
                self.flow = Flow::BranchPending;
            }
            Flow::ExceptionJustEntered => self.flow = Flow::Normal,
        }
    }

    /// Write a system control register, driving the translate-mode output
    /// when the ICS changes.
    pub(crate) fn set_scr(&mut self, index: usize, value: u32) {
        tracing::trace!(scr = scr::NAMES[index], value, "set_scr");
        if index == scr::ICS {
            self.set_translate_mode(value & crate::registers::ics::TRANSLATE != 0);
        }
        self.regs.scr[index] = value;
    }

    pub(crate) fn set_translate_mode(&mut self, enabled: bool) {
        if self.translate_mode != enabled {
            tracing::debug!(enabled, "translate mode");
        }
        self.translate_mode = enabled;
    }

    /// Capture everything needed to resume later.
    #[must_use]
    pub fn snapshot(&self) -> RompState {
        RompState {
            regs: self.regs,
            flow: self.flow,
            branch_target: self.branch_target,
            translate_mode: self.translate_mode,
            pending_machine_check: self.pending_machine_check,
            total_cycles: self.total_cycles,
        }
    }

    /// Resume from a snapshot.
    pub fn restore(&mut self, state: &RompState) {
        self.regs = state.regs;
        self.flow = state.flow;
        self.branch_target = state.branch_target;
        self.translate_mode = state.translate_mode;
        self.pending_machine_check = state.pending_machine_check;
        self.total_cycles = state.total_cycles;
    }
}

impl Cpu for Romp {
    type Registers = Registers;

    fn run<B: Bus>(&mut self, bus: &mut B, budget: &mut CycleBudget) {
        while !budget.is_exhausted() {
            let cycles = self.step(bus);
            budget.consume(i64::from(cycles));
            self.total_cycles += u64::from(cycles);
        }
    }

    fn reset<B: Bus>(&mut self, bus: &mut B) {
        self.regs = Registers::new();
        self.set_translate_mode(false);
        self.flow = Flow::Normal;
        self.branch_target = 0;
        self.pending_machine_check = None;
        self.regs.scr[scr::IAR] = bus.read_u32(AddressSpace::Program, 0);
    }

    /// Lines 0 to 6 feed the interrupt request buffer. A request stays
    /// pending for as long as the line is asserted.
    fn set_input_line(&mut self, line: u8, state: LineState) {
        if line > 6 {
            return;
        }
        let bit = irb::LEVEL0 >> line;
        if state.is_asserted() {
            tracing::trace!(line, "interrupt request");
            self.regs.scr[scr::IRB] |= bit;
        } else {
            self.regs.scr[scr::IRB] &= !bit;
        }
    }

    fn pc(&self) -> u32 {
        self.regs.iar()
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn flags_string(&self) -> String {
        self.condition().to_string()
    }
}

/// All query paths supported by the ROMP.
const ROMP_QUERY_PATHS: &[&str] = &[
    "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11", "r12", "r13",
    "r14", "r15", "scr0", "scr1", "scr2", "scr3", "scr4", "scr5", "cous", "cou", "ts", "scr9",
    "mq", "mpcs", "irb", "iar", "ics", "cs", "flags.l", "flags.e", "flags.g", "flags.c",
    "flags.o", "flags.t", "flow", "branch_target", "translate_mode", "cycles",
];

fn gpr_index(path: &str) -> Option<usize> {
    let n: usize = path.strip_prefix('r')?.parse().ok()?;
    (n < 16).then_some(n)
}

fn scr_index(path: &str) -> Option<usize> {
    scr::NAMES.iter().position(|&name| name == path)
}

fn flag_mask(path: &str) -> Option<u32> {
    Some(match path.strip_prefix("flags.")? {
        "l" => flags::L,
        "e" => flags::E,
        "g" => flags::G,
        "c" => flags::C,
        "o" => flags::O,
        "t" => flags::T,
        _ => return None,
    })
}

impl Observable for Romp {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(r) = gpr_index(path) {
            return Some(self.regs.gpr[r].into());
        }
        if let Some(s) = scr_index(path) {
            return Some(self.regs.scr[s].into());
        }
        if let Some(mask) = flag_mask(path) {
            return Some((self.regs.cs() & mask != 0).into());
        }
        match path {
            "flow" => Some(self.flow.name().into()),
            "branch_target" => Some(self.branch_target.into()),
            "translate_mode" => Some(self.translate_mode.into()),
            "cycles" => Some(self.total_cycles.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        ROMP_QUERY_PATHS
    }

    fn poke(&mut self, path: &str, value: Value) -> Result<(), StateError> {
        if let Some(r) = gpr_index(path) {
            self.regs.gpr[r] = value.to_register(path)?;
        } else if let Some(s) = scr_index(path) {
            self.regs.scr[s] = value.to_register(path)?;
        } else if let Some(mask) = flag_mask(path) {
            let set = value
                .as_bool()
                .ok_or_else(|| StateError::mismatch(path, "bool"))?;
            if set {
                self.regs.scr[scr::CS] |= mask;
            } else {
                self.regs.scr[scr::CS] &= !mask;
            }
        } else if path == "branch_target" {
            self.branch_target = value.to_register(path)?;
        } else if matches!(path, "flow" | "translate_mode" | "cycles") {
            return Err(StateError::ReadOnly(path.to_string()));
        } else {
            return Err(StateError::UnknownPath(path.to_string()));
        }
        Ok(())
    }
}
