//! Core register file.

use crate::status::Status;

/// Depth of the hardware return stack.
pub const STACK_DEPTH: usize = 8;

/// Architectural registers of the TMS3202x core.
///
/// The on-chip peripheral registers (DRR, DXR, TIM, PRD, IMR, GREG) are
/// memory mapped and live with the on-chip RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    /// Program counter (word address).
    pub pc: u16,
    /// Prefetch counter, the source pointer of block moves and MAC.
    pub pfc: u16,
    /// 32-bit accumulator.
    pub acc: u32,
    /// Product register.
    pub p: u32,
    /// Multiplier input.
    pub t: u16,
    /// Auxiliary registers AR0-AR7.
    pub ar: [u16; 8],
    /// Return stack. Index 7 is the top.
    pub stack: [u16; STACK_DEPTH],
    /// Repeat counter.
    pub rptc: u8,
    /// Interrupt flag register, six request bits.
    pub ifr: u16,
    pub status: Status,
}

impl Registers {
    /// Cleared register file for a part whose ST1 fixes `st1_fixed` to one.
    #[must_use]
    pub const fn new(st1_fixed: u16) -> Self {
        Self {
            pc: 0,
            pfc: 0,
            acc: 0,
            p: 0,
            t: 0,
            ar: [0; 8],
            stack: [0; STACK_DEPTH],
            rptc: 0,
            ifr: 0,
            status: Status::new(st1_fixed),
        }
    }

    /// Push onto the hardware stack. The bottom entry is lost.
    pub fn push(&mut self, value: u16) {
        self.stack.copy_within(1.., 0);
        self.stack[STACK_DEPTH - 1] = value;
    }

    /// Pop the hardware stack. The bottom entry is duplicated.
    pub fn pop(&mut self) -> u16 {
        let top = self.stack[STACK_DEPTH - 1];
        self.stack.copy_within(..STACK_DEPTH - 1, 1);
        top
    }

    /// The auxiliary register selected by ARP.
    #[must_use]
    pub const fn current_ar(&self) -> u16 {
        self.ar[self.status.arp()]
    }

    pub const fn current_ar_mut(&mut self) -> &mut u16 {
        &mut self.ar[self.status.arp()]
    }
}
