//! Interrupt and exception entry.
//!
//! Each level owns a 16-byte block at `0x100 + level * 16`:
//!
//! | Offset | Size | Contents |
//! |---|---|---|
//! | 0 | 4 | old IAR |
//! | 4 | 2 | old ICS |
//! | 6 | 2 | old CS |
//! | 8 | 4 | new IAR |
//! | 12 | 2 | new ICS |
//! | 14 | 2 | new CS (levels 0-6) or SVC code (level 9) |
//!
//! Levels 0-6 are external interrupts, 7 is machine check, 8 is program
//! check and 9 is supervisor call.

use emu_core::{AddressSpace, Bus};

use crate::cpu::{Flow, Romp};
use crate::registers::{ics, irb, mpcs, scr};

const VECTOR_BASE: u32 = 0x100;
const MACHINE_CHECK: u32 = 7;
const PROGRAM_CHECK: u32 = 8;
pub(crate) const SUPERVISOR_CALL: u32 = 9;

impl Romp {
    /// Take a pending machine check or the highest-priority unmasked
    /// interrupt request. Returns true when an entry was made.
    pub(crate) fn service_interrupts<B: Bus>(&mut self, bus: &mut B) -> bool {
        if let Some(status) = self.take_machine_check() {
            self.machine_check(bus, status);
            return true;
        }

        let ics_value = self.regs.ics();
        let requests = self.regs.scr[scr::IRB];
        if ics_value & ics::MASK != 0 || requests & irb::ALL == 0 {
            return false;
        }

        let priority = ics_value & ics::PRIORITY;
        let Some(level) = (0..priority).find(|&level| requests & (irb::LEVEL0 >> level) != 0)
        else {
            return false;
        };

        tracing::debug!(level, "taking interrupt request");
        self.enter_exception(bus, level, 0);
        self.flow = Flow::ExceptionJustEntered;
        true
    }

    /// Raise a program check with the given status bits.
    pub(crate) fn program_check<B: Bus>(&mut self, bus: &mut B, status: u32) {
        tracing::debug!(iar = self.regs.iar(), status, "program check");
        let mpcs_value = self.regs.scr[scr::MPCS];
        self.regs.scr[scr::MPCS] =
            (mpcs_value & !mpcs::PROGRAM_ALL) | (status & mpcs::PROGRAM_ALL);
        self.enter_exception(bus, PROGRAM_CHECK, 0);
        self.flow = Flow::ExceptionJustEntered;
    }

    /// Raise a machine check with the given status bits.
    pub(crate) fn machine_check<B: Bus>(&mut self, bus: &mut B, status: u32) {
        tracing::debug!(status, "machine check");
        let mpcs_value = self.regs.scr[scr::MPCS];
        self.regs.scr[scr::MPCS] =
            (mpcs_value & !mpcs::MACHINE_ALL) | (status & mpcs::MACHINE_ALL);
        self.enter_exception(bus, MACHINE_CHECK, 0);
        self.flow = Flow::ExceptionJustEntered;
    }

    /// Swap program status through the block of `level`. The caller sets
    /// the control-flow token.
    pub(crate) fn enter_exception<B: Bus>(&mut self, bus: &mut B, level: u32, svc_code: u16) {
        let address = VECTOR_BASE + level * 16;

        self.set_translate_mode(false);

        bus.write_u32(AddressSpace::Program, address, self.regs.iar());
        bus.write_u16(AddressSpace::Program, address + 4, self.regs.ics() as u16);
        bus.write_u16(AddressSpace::Program, address + 6, self.regs.cs() as u16);
        if level == SUPERVISOR_CALL {
            bus.write_u16(AddressSpace::Program, address + 14, svc_code);
        }

        self.regs.scr[scr::IAR] = bus.read_u32(AddressSpace::Program, address + 8);
        self.regs.scr[scr::ICS] = u32::from(bus.read_u16(AddressSpace::Program, address + 12));
        if level < MACHINE_CHECK {
            self.regs.scr[scr::CS] =
                u32::from(bus.read_u16(AddressSpace::Program, address + 14));
        }

        self.set_translate_mode(self.regs.ics() & ics::TRANSLATE != 0);
    }
}
