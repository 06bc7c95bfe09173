//! Status registers ST0 and ST1.
//!
//! ```text
//! ST0: | 15 14 13 | 12 | 11  | 10 |  9   | 8 ........ 0 |
//!      |   ARP    | OV | OVM |  1 | INTM |      DP      |
//!
//! ST1: | 15 14 13 |  12  | 11 | 10  | 9 | 8 |  7   | 6  |  5  | 4  | 3  |  2  | 1 0 |
//!      |   ARB    | CNF0 | TC | SXM | C | 1 | 1/CNF1 | HM | FSM | XF | FO | TXM | PM  |
//! ```
//!
//! Bit 7 of ST1 is a fixed one on the TMS32025 and CNF1 on the TMS32026.
//! Handlers go through the typed accessors; only this module touches the
//! packed words.

use std::fmt;

// ST0
/// Auxiliary register pointer.
pub const ARP: u16 = 0xE000;
/// Overflow flag.
pub const OV: u16 = 0x1000;
/// Overflow (saturation) mode.
pub const OVM: u16 = 0x0800;
/// Fixed one in ST0.
pub const ST0_FIXED: u16 = 0x0400;
/// Interrupt mask. Set disables maskable interrupts.
pub const INTM: u16 = 0x0200;
/// Data memory page pointer.
pub const DP: u16 = 0x01FF;

// ST1
/// Auxiliary register pointer backup.
pub const ARB: u16 = 0xE000;
/// On-chip RAM configuration, bit 0.
pub const CNF0: u16 = 0x1000;
/// Test/control flag.
pub const TC: u16 = 0x0800;
/// Sign-extension mode.
pub const SXM: u16 = 0x0400;
/// Carry.
pub const C: u16 = 0x0200;
/// On-chip RAM configuration, bit 1 (TMS32026).
pub const CNF1: u16 = 0x0080;
/// Hold mode.
pub const HM: u16 = 0x0040;
/// Serial frame synchronisation mode.
pub const FSM: u16 = 0x0020;
/// XF output pin.
pub const XF: u16 = 0x0010;
/// Serial format (8/16 bit).
pub const FO: u16 = 0x0008;
/// Serial transmit mode.
pub const TXM: u16 = 0x0004;
/// Product shift mode.
pub const PM: u16 = 0x0003;

const ST0_RESET: u16 = 0x0600;
const ST1_RESET: u16 = 0x07F0;

/// Typed view of the two status registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status {
    st0: u16,
    st1: u16,
    st1_fixed: u16,
}

impl Status {
    /// Power-on status for a part whose ST1 holds `st1_fixed` as ones.
    #[must_use]
    pub const fn new(st1_fixed: u16) -> Self {
        let mut status = Self {
            st0: 0,
            st1: 0,
            st1_fixed,
        };
        status.reset();
        status
    }

    /// Reset values: INTM, SXM, C, HM, FSM and XF set, every other
    /// documented bit clear.
    pub const fn reset(&mut self) {
        self.st0 = ST0_RESET;
        self.st1 = (ST1_RESET & !CNF1) | self.st1_fixed;
    }

    /// Raw ST0.
    #[must_use]
    pub const fn st0(self) -> u16 {
        self.st0
    }

    /// Raw ST1.
    #[must_use]
    pub const fn st1(self) -> u16 {
        self.st1
    }

    const fn set0(&mut self, mask: u16, on: bool) {
        if on {
            self.st0 |= mask;
        } else {
            self.st0 &= !mask;
        }
        self.st0 |= ST0_FIXED;
    }

    const fn set1(&mut self, mask: u16, on: bool) {
        if on {
            self.st1 |= mask;
        } else {
            self.st1 &= !mask;
        }
        self.st1 |= self.st1_fixed;
    }

    // === ST0 ===

    /// Active auxiliary register.
    #[must_use]
    pub const fn arp(self) -> usize {
        (self.st0 >> 13) as usize
    }

    #[must_use]
    pub const fn ov(self) -> bool {
        self.st0 & OV != 0
    }

    #[must_use]
    pub const fn ovm(self) -> bool {
        self.st0 & OVM != 0
    }

    #[must_use]
    pub const fn intm(self) -> bool {
        self.st0 & INTM != 0
    }

    /// Data page, in units of 128 words.
    #[must_use]
    pub const fn dp(self) -> u16 {
        self.st0 & DP
    }

    /// Select a new active auxiliary register. The previous pointer is
    /// saved in ARB.
    pub const fn set_arp(&mut self, n: usize) {
        self.st1 = (self.st1 & !ARB) | (self.st0 & ARP) | self.st1_fixed;
        self.st0 = (self.st0 & !ARP) | (((n as u16) << 13) & ARP) | ST0_FIXED;
    }

    pub const fn set_ov(&mut self, on: bool) {
        self.set0(OV, on);
    }

    pub const fn set_ovm(&mut self, on: bool) {
        self.set0(OVM, on);
    }

    pub const fn set_intm(&mut self, on: bool) {
        self.set0(INTM, on);
    }

    pub const fn set_dp(&mut self, page: u16) {
        self.st0 = (self.st0 & !DP) | (page & DP) | ST0_FIXED;
    }

    /// `LST`: load ST0 from memory. INTM is not affected.
    pub const fn load_st0(&mut self, value: u16) {
        self.st0 = (self.st0 & INTM) | (value & !INTM) | ST0_FIXED;
    }

    // === ST1 ===

    /// Backup auxiliary register pointer.
    #[must_use]
    pub const fn arb(self) -> usize {
        (self.st1 >> 13) as usize
    }

    #[must_use]
    pub const fn cnf0(self) -> bool {
        self.st1 & CNF0 != 0
    }

    /// CNF1. Reads the fixed one on the TMS32025.
    #[must_use]
    pub const fn cnf1(self) -> bool {
        self.st1 & CNF1 != 0
    }

    #[must_use]
    pub const fn tc(self) -> bool {
        self.st1 & TC != 0
    }

    #[must_use]
    pub const fn sxm(self) -> bool {
        self.st1 & SXM != 0
    }

    #[must_use]
    pub const fn carry(self) -> bool {
        self.st1 & C != 0
    }

    #[must_use]
    pub const fn hm(self) -> bool {
        self.st1 & HM != 0
    }

    #[must_use]
    pub const fn fsm(self) -> bool {
        self.st1 & FSM != 0
    }

    #[must_use]
    pub const fn xf(self) -> bool {
        self.st1 & XF != 0
    }

    #[must_use]
    pub const fn fo(self) -> bool {
        self.st1 & FO != 0
    }

    #[must_use]
    pub const fn txm(self) -> bool {
        self.st1 & TXM != 0
    }

    /// Product shift mode, 0 to 3.
    #[must_use]
    pub const fn pm(self) -> u16 {
        self.st1 & PM
    }

    pub const fn set_cnf0(&mut self, on: bool) {
        self.set1(CNF0, on);
    }

    pub const fn set_cnf1(&mut self, on: bool) {
        self.set1(CNF1, on);
    }

    pub const fn set_tc(&mut self, on: bool) {
        self.set1(TC, on);
    }

    pub const fn set_sxm(&mut self, on: bool) {
        self.set1(SXM, on);
    }

    pub const fn set_carry(&mut self, on: bool) {
        self.set1(C, on);
    }

    pub const fn set_hm(&mut self, on: bool) {
        self.set1(HM, on);
    }

    pub const fn set_fsm(&mut self, on: bool) {
        self.set1(FSM, on);
    }

    pub const fn set_xf(&mut self, on: bool) {
        self.set1(XF, on);
    }

    pub const fn set_fo(&mut self, on: bool) {
        self.set1(FO, on);
    }

    pub const fn set_txm(&mut self, on: bool) {
        self.set1(TXM, on);
    }

    pub const fn set_pm(&mut self, mode: u16) {
        self.st1 = (self.st1 & !PM) | (mode & PM) | self.st1_fixed;
    }

    /// `LST1`: load ST1 from memory. ARB is copied into ARP as well.
    pub const fn load_st1(&mut self, value: u16) {
        self.st1 = value | self.st1_fixed;
        self.st0 = (self.st0 & !ARP) | (self.st1 & ARB);
    }

    /// Overwrite both words, keeping the fixed bits. Used by debugger pokes.
    pub const fn set_raw(&mut self, st0: u16, st1: u16) {
        self.st0 = st0 | ST0_FIXED;
        self.st1 = st1 | self.st1_fixed;
    }
}

const fn mark(set: bool, yes: char, no: char) -> char {
    if set { yes } else { no }
}

impl fmt::Display for Status {
    /// Debugger rendering, for example `arp0...Idp000  arb0D.SC..HFX.ipm0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (s0, s1) = (self.st0, self.st1);
        write!(
            f,
            "arp{}{}{}{}{}dp{:03x}  arb{}",
            self.arp(),
            mark(s0 & OV != 0, 'O', '.'),
            mark(s0 & OVM != 0, 'M', '.'),
            mark(s0 & ST0_FIXED != 0, '.', '?'),
            mark(s0 & INTM != 0, 'I', '.'),
            self.dp(),
            self.arb(),
        )?;
        let bits = [
            mark(s1 & CNF0 != 0, 'P', 'D'),
            mark(s1 & TC != 0, 'T', '.'),
            mark(s1 & SXM != 0, 'S', '.'),
            mark(s1 & C != 0, 'C', '?'),
            mark(s1 & 0x0100 != 0, '.', '?'),
            mark(s1 & CNF1 != 0, '.', '?'),
            mark(s1 & HM != 0, 'H', '.'),
            mark(s1 & FSM != 0, 'F', '.'),
            mark(s1 & XF != 0, 'X', '.'),
            mark(s1 & FO != 0, 'f', '.'),
            mark(s1 & TXM != 0, 'o', 'i'),
        ];
        for c in bits {
            write!(f, "{c}")?;
        }
        write!(f, "pm{}", self.pm())
    }
}
