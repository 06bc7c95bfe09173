//! Interrupt arbitration and the on-chip timer.
//!
//! Requests latch into IFR and stay there until serviced; only the
//! service routine clears a bit. The lowest-numbered pending source that
//! IMR enables wins.

use emu_core::CycleBudget;

use crate::cpu::{CLK, Tms32025};

/// Interrupt flag register bits.
pub mod ifr {
    pub const INT0: u16 = 0x01;
    pub const INT1: u16 = 0x02;
    pub const INT2: u16 = 0x04;
    /// Timer.
    pub const TINT: u16 = 0x08;
    /// Serial receive.
    pub const RINT: u16 = 0x10;
    /// Serial transmit.
    pub const XINT: u16 = 0x20;
    pub const ALL: u16 = 0x3F;
}

/// Input line numbers for [`emu_core::Cpu::set_input_line`].
pub mod line {
    pub const INT0: u8 = 0;
    pub const INT1: u8 = 1;
    pub const INT2: u8 = 2;
    pub const TINT: u8 = 3;
    pub const RINT: u8 = 4;
    pub const XINT: u8 = 5;
    /// Serial transmit frame sync.
    pub const FSX: u8 = 6;
}

/// Program-space entry points.
pub mod vector {
    pub const INT0: u16 = 0x0002;
    pub const INT1: u16 = 0x0004;
    pub const INT2: u16 = 0x0006;
    pub const TINT: u16 = 0x0018;
    pub const RINT: u16 = 0x001A;
    pub const XINT: u16 = 0x001C;
    pub const TRAP: u16 = 0x001E;
}

/// Sources in priority order.
const SOURCES: [(&str, u16); 6] = [
    ("INT0", vector::INT0),
    ("INT1", vector::INT1),
    ("INT2", vector::INT2),
    ("TINT", vector::TINT),
    ("RINT", vector::RINT),
    ("XINT", vector::XINT),
];

/// `EINT` takes effect after the following instruction.
const EINT: u16 = 0xCE00;

impl Tms32025 {
    /// Take the highest-priority enabled request, if interrupts are on.
    /// Returns the clocks used.
    pub(crate) fn service_interrupts(&mut self) -> u32 {
        let pending = self.regs.ifr & self.ram.imr & ifr::ALL;
        if self.regs.status.intm() || self.opcode == EINT || pending == 0 {
            return 0;
        }

        let index = pending.trailing_zeros() as usize;
        let bit = 1u16 << index;
        let (source, target) = SOURCES[index];

        let pc = self.regs.pc;
        self.regs.push(pc);
        match bit {
            ifr::RINT => self.ram.drr = self.serial_in,
            ifr::XINT => self.serial_out.push(self.ram.dxr),
            _ => {}
        }
        tracing::debug!(source, pc, vector = target, "interrupt");

        self.regs.pc = target;
        self.regs.ifr &= !bit;
        self.idle = false;
        self.regs.status.set_intm(true);
        3 * CLK
    }

    /// Let `clocks` pass on the timer, debiting them from the budget. On
    /// underflow the timer reloads from PRD, TINT is raised and any
    /// service it triggers is charged in turn.
    pub(crate) fn advance_timer(&mut self, budget: &mut CycleBudget, mut clocks: u32) {
        loop {
            let preclocks = CLK - self.timer_phase;
            if clocks < preclocks {
                self.timer_phase += clocks;
                self.consume(budget, clocks);
                return;
            }

            let ticks = 1 + (clocks - preclocks) / CLK;
            let tim = u32::from(self.ram.tim);
            if ticks <= tim {
                self.consume(budget, clocks);
                self.timer_phase = clocks - (ticks - 1) * CLK - preclocks;
                self.ram.tim = (tim - ticks) as u16;
                return;
            }

            // Clocks past the reload are dropped.
            self.consume(budget, preclocks + CLK * tim);
            self.timer_phase = 0;
            self.ram.tim = self.ram.prd;
            self.regs.ifr |= ifr::TINT;
            tracing::trace!(prd = self.ram.prd, "timer reload");
            clocks = self.service_interrupts();
        }
    }

    pub(crate) fn consume(&mut self, budget: &mut CycleBudget, clocks: u32) {
        budget.consume(i64::from(clocks));
        self.total_cycles += u64::from(clocks);
    }
}
