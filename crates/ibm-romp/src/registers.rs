//! ROMP register file.
//!
//! Sixteen 32-bit general registers and sixteen system control registers
//! (SCRs). The instruction address register and condition status live in
//! the SCR file, so `mfs`/`mts` can reach them like any other SCR.

/// System control register indices.
pub mod scr {
    /// Counter source.
    pub const COUS: usize = 6;
    /// Counter.
    pub const COU: usize = 7;
    /// Timer status.
    pub const TS: usize = 8;
    /// Multiplier quotient.
    pub const MQ: usize = 10;
    /// Machine check / program check status.
    pub const MPCS: usize = 11;
    /// Interrupt request buffer.
    pub const IRB: usize = 12;
    /// Instruction address register.
    pub const IAR: usize = 13;
    /// Interrupt control status.
    pub const ICS: usize = 14;
    /// Condition status.
    pub const CS: usize = 15;

    /// Introspection names, indexed by SCR number.
    pub const NAMES: [&str; 16] = [
        "scr0", "scr1", "scr2", "scr3", "scr4", "scr5", "cous", "cou", "ts", "scr9", "mq", "mpcs",
        "irb", "iar", "ics", "cs",
    ];
}

/// Interrupt control status bits.
pub mod ics {
    /// Processor priority: levels below this value may interrupt.
    pub const PRIORITY: u32 = 0x0007;
    /// Check stop mask.
    pub const CHECK_STOP: u32 = 0x0070;
    /// Parity error retry.
    pub const PARITY_RETRY: u32 = 0x0080;
    /// Translate mode.
    pub const TRANSLATE: u32 = 0x0100;
    /// Unprivileged state.
    pub const UNPRIVILEGED: u32 = 0x0200;
    /// Memory protect.
    pub const PROTECT: u32 = 0x0400;
    /// Interrupt mask: no external level is taken while set.
    pub const MASK: u32 = 0x1000;
    /// Check stop disable.
    pub const CHECK_DISABLE: u32 = 0x2000;
}

/// Interrupt request buffer bits.
pub mod irb {
    /// Request bit of level 0. Level `n` is `LEVEL0 >> n`.
    pub const LEVEL0: u32 = 0x8000;
    /// Request bits of levels 0 through 6.
    pub const ALL: u32 = 0xFE00;
}

/// Machine check and program check status bits.
pub mod mpcs {
    /// Instruction address exception.
    pub const ADDRESS: u32 = 0x0002;
    /// Privileged instruction exception.
    pub const PRIVILEGED: u32 = 0x0004;
    /// Illegal operation code.
    pub const ILLEGAL_OP: u32 = 0x0008;
    /// Invalid data address.
    pub const DATA_ADDRESS: u32 = 0x0010;
    /// Program trap.
    pub const TRAP: u32 = 0x0020;
    /// Program check with known origin.
    pub const KNOWN_ORIGIN: u32 = 0x0040;
    /// Program check with unknown origin.
    pub const UNKNOWN_ORIGIN: u32 = 0x0080;
    /// All program check status bits.
    pub const PROGRAM_ALL: u32 = 0x00FE;
    /// All machine check status bits.
    pub const MACHINE_ALL: u32 = 0x7F00;
}

/// ROMP register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    /// General registers.
    pub gpr: [u32; 16],
    /// System control registers.
    pub scr: [u32; 16],
}

impl Registers {
    /// All registers cleared.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            gpr: [0; 16],
            scr: [0; 16],
        }
    }

    /// Instruction address register.
    #[must_use]
    pub const fn iar(&self) -> u32 {
        self.scr[scr::IAR]
    }

    /// Condition status.
    #[must_use]
    pub const fn cs(&self) -> u32 {
        self.scr[scr::CS]
    }

    /// Interrupt control status.
    #[must_use]
    pub const fn ics(&self) -> u32 {
        self.scr[scr::ICS]
    }

    /// General register `r`, reading register 0 as zero. Base and index
    /// operands use this form.
    #[must_use]
    pub const fn gpr_or_zero(&self, r: usize) -> u32 {
        if r == 0 { 0 } else { self.gpr[r] }
    }
}
