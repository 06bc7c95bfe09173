//! Instruction handlers.
//!
//! Each handler returns the cycles it costs beyond the table's base cost.

use emu_core::{AddressSpace, Bus};

use crate::cpu::{Flow, Romp, Step};
use crate::decode::{Op, ba, bi, ji, r2, r3};
use crate::exceptions::SUPERVISOR_CALL;
use crate::flags::ConditionStatus;
use crate::registers::{ics, mpcs, scr};

const PROGRAM: AddressSpace = AddressSpace::Program;
/// I/O addresses at or above this raise a program check.
const IO_LIMIT: u32 = 0x0100_0000;
const TAKEN: u32 = 4;

const fn sext16(value: u16) -> u32 {
    value as i16 as i32 as u32
}

fn shl(value: u32, amount: u32) -> u32 {
    value.checked_shl(amount).unwrap_or(0)
}

fn shr(value: u32, amount: u32) -> u32 {
    value.checked_shr(amount).unwrap_or(0)
}

fn sar(value: u32, amount: u32) -> u32 {
    let value = value as i32;
    value.checked_shr(amount).unwrap_or(value >> 31) as u32
}

impl Romp {
    fn logical(&mut self, result: u32) {
        self.update_cs(|cs| cs.set_logical(result));
    }

    fn add_flags(&mut self, op1: u32, op2: u32) {
        self.update_cs(|cs| cs.set_add(op1, op2));
    }

    fn sub_flags(&mut self, op1: u32, op2: u32) {
        self.update_cs(|cs| cs.set_sub(op1, op2));
    }

    fn update_cs(&mut self, f: impl FnOnce(&mut ConditionStatus)) {
        let mut cs = ConditionStatus::new(self.regs.cs());
        f(&mut cs);
        self.regs.scr[scr::CS] = cs.raw();
    }

    fn carry_in(&self) -> u32 {
        u32::from(self.condition().carry())
    }

    /// CS bit named by the R2 field of a branch.
    fn branch_condition(&self, op: u16) -> bool {
        self.condition().bit((r2(op) ^ 15) as u32)
    }

    fn set_test_bit(&mut self, value: bool) {
        self.update_cs(|cs| cs.set_test(value));
    }

    /// Latch a branch. Returns the taken-branch cost.
    fn branch(&mut self, target: u32, with_execute: bool) -> u32 {
        self.branch_target = target;
        self.flow = if with_execute {
            Flow::DelaySlotPending
        } else {
            Flow::BranchPending
        };
        TAKEN
    }

    fn trap(&mut self, bus: &mut impl Bus) {
        self.program_check(bus, mpcs::KNOWN_ORIGIN | mpcs::TRAP);
    }

    fn illegal(&mut self, bus: &mut impl Bus) {
        self.program_check(bus, mpcs::KNOWN_ORIGIN | mpcs::ILLEGAL_OP);
    }

    /// Execute one decoded instruction.
    pub(crate) fn execute<B: Bus>(&mut self, bus: &mut B, handler: Op, step: Step) -> u32 {
        let Step { op, ext, next } = step;
        let iar = self.regs.iar();
        let (r2, r3) = (r2(op), r3(op));
        let imm = sext16(ext);
        // Base register of D-format storage and address operands.
        let base = self.regs.gpr_or_zero(r3);
        let ea = base.wrapping_add(imm);
        let tm_cost = if self.regs.ics() & ics::TRANSLATE != 0 { 3 } else { 2 };
        let g = &mut self.regs.gpr;

        match handler {
            // === JI and D-short ===
            Op::Jb => {
                let bit = ((op >> 8) & 7) ^ 7;
                let wanted = op & 0x0800 != 0;
                if self.condition().bit(u32::from(bit)) == wanted {
                    return self.branch(iar.wrapping_add(ji(op)), false);
                }
            }
            Op::Stcs => {
                let at = base.wrapping_add(u32::from((op >> 8) & 15));
                bus.write_u8(PROGRAM, at, g[r2] as u8);
            }
            Op::Sths => {
                let at = base.wrapping_add(u32::from((op >> 7) & 30));
                bus.write_u16(PROGRAM, at, g[r2] as u16);
            }
            Op::Sts => {
                let at = base.wrapping_add(u32::from((op >> 6) & 60));
                bus.write_u32(PROGRAM, at, g[r2]);
            }
            Op::Lcs => {
                let at = base.wrapping_add(u32::from((op >> 8) & 15));
                self.regs.gpr[r2] = u32::from(bus.read_u8(PROGRAM, at));
            }
            Op::Lhas => {
                let at = base.wrapping_add(u32::from((op >> 7) & 30));
                self.regs.gpr[r2] = sext16(bus.read_u16(PROGRAM, at));
            }
            Op::Cas => {
                let rd = usize::from((op >> 8) & 15);
                g[rd] = g[r2].wrapping_add(base);
            }
            Op::Ls => {
                let at = base.wrapping_add(u32::from((op >> 6) & 60));
                self.regs.gpr[r2] = bus.read_u32(PROGRAM, at);
            }

            // === BI and BA ===
            Op::Bnb | Op::Bnbx => {
                if !self.branch_condition(op) {
                    return self.branch(iar.wrapping_add(bi(op, ext)), handler == Op::Bnbx);
                }
            }
            Op::Bb | Op::Bbx => {
                if self.branch_condition(op) {
                    return self.branch(iar.wrapping_add(bi(op, ext)), handler == Op::Bbx);
                }
            }
            Op::Bala => {
                g[15] = next;
                return self.branch(ba(op, ext), false);
            }
            Op::Balax => {
                g[15] = next.wrapping_add(4);
                return self.branch(ba(op, ext), true);
            }
            Op::Bali => {
                g[r2] = next;
                return self.branch(iar.wrapping_add(bi(op, ext)), false);
            }
            Op::Balix => {
                g[r2] = next.wrapping_add(4);
                return self.branch(iar.wrapping_add(bi(op, ext)), true);
            }

            // === D ===
            Op::Svc => {
                let code = base.wrapping_add(u32::from(ext)) as u16;
                self.enter_exception(bus, SUPERVISOR_CALL, code);
                self.flow = Flow::ExceptionJustEntered;
                return 15;
            }
            Op::Ai => {
                let a = g[r3];
                g[r2] = a.wrapping_add(imm);
                self.add_flags(a, imm);
            }
            Op::Cal16 => {
                g[r2] = (base & 0xFFFF_0000) | u32::from(base.wrapping_add(u32::from(ext)) as u16);
            }
            Op::Oiu => {
                g[r2] = (u32::from(ext) << 16) | g[r3];
                self.logical(self.regs.gpr[r2]);
            }
            Op::Oil => {
                g[r2] = u32::from(ext) | g[r3];
                self.logical(self.regs.gpr[r2]);
            }
            Op::Nilz => {
                g[r2] = u32::from(ext) & g[r3];
                self.logical(self.regs.gpr[r2]);
            }
            Op::Nilo => {
                g[r2] = (u32::from(ext) | 0xFFFF_0000) & g[r3];
                self.logical(self.regs.gpr[r2]);
            }
            Op::Xil => {
                g[r2] = u32::from(ext) ^ g[r3];
                self.logical(self.regs.gpr[r2]);
            }
            Op::Cal => g[r2] = ea,
            Op::Lm => {
                let mut at = ea;
                for reg in r2..16 {
                    self.regs.gpr[reg] = bus.read_u32(PROGRAM, at);
                    at = at.wrapping_add(4);
                }
                let per_register = 2 * (16 - r2) as u32;
                return per_register + if tm_cost == 3 { 3 } else { 1 };
            }
            Op::Lha => self.regs.gpr[r2] = sext16(bus.read_u16(PROGRAM, ea)),
            Op::Ior => {
                let port = base.wrapping_add(u32::from(ext));
                if port < IO_LIMIT {
                    self.regs.gpr[r2] = bus.read_u32(AddressSpace::Io, port);
                } else {
                    self.illegal(bus);
                }
            }
            Op::Ti => {
                let a = g[r3];
                if (op & 0x40 != 0 && a < imm)
                    || (op & 0x20 != 0 && a == imm)
                    || (op & 0x10 != 0 && a > imm)
                {
                    self.trap(bus);
                }
            }
            Op::L => self.regs.gpr[r2] = bus.read_u32(PROGRAM, ea),
            Op::Lc => self.regs.gpr[r2] = u32::from(bus.read_u8(PROGRAM, ea)),
            Op::Tsh => {
                self.regs.gpr[r2] = u32::from(bus.read_u16(PROGRAM, ea));
                bus.write_u8(PROGRAM, ea, 0xFF);
            }
            Op::Lps => {
                let target = bus.read_u32(PROGRAM, ea);
                let new_ics = u32::from(bus.read_u16(PROGRAM, ea.wrapping_add(4)));
                let new_cs = u32::from(bus.read_u16(PROGRAM, ea.wrapping_add(6)));
                self.branch(target, false);
                self.set_scr(scr::ICS, new_ics);
                self.regs.scr[scr::CS] = new_cs;
                self.regs.scr[scr::MPCS] &= !0xFFFF;
                return 15;
            }
            Op::Aei => {
                let a = g[r3];
                let b = imm.wrapping_add(self.carry_in());
                self.regs.gpr[r2] = a.wrapping_add(b);
                self.add_flags(a, b);
            }
            Op::Sfi => {
                let b = g[r3];
                g[r2] = imm.wrapping_sub(b);
                self.sub_flags(imm, b);
            }
            Op::Cli | Op::Ci => {
                let diff = g[r3].wrapping_sub(imm);
                self.logical(diff);
            }
            Op::Niuz => {
                g[r2] = (u32::from(ext) << 16) & g[r3];
                self.logical(self.regs.gpr[r2]);
            }
            Op::Niuo => {
                g[r2] = ((u32::from(ext) << 16) | 0x0000_FFFF) & g[r3];
                self.logical(self.regs.gpr[r2]);
            }
            Op::Xiu => {
                g[r2] = (u32::from(ext) << 16) ^ g[r3];
                self.logical(self.regs.gpr[r2]);
            }
            Op::Cau => g[r2] = base.wrapping_add(u32::from(ext) << 16),
            Op::Stm => {
                let mut at = ea;
                for reg in r2..16 {
                    bus.write_u32(PROGRAM, at, self.regs.gpr[reg]);
                    at = at.wrapping_add(4);
                }
                return tm_cost * (16 - r2) as u32 + tm_cost;
            }
            Op::Lh => self.regs.gpr[r2] = u32::from(bus.read_u16(PROGRAM, ea)),
            Op::Iow => {
                let port = base.wrapping_add(u32::from(ext));
                if port < IO_LIMIT {
                    bus.write_u32(AddressSpace::Io, port, g[r2]);
                } else {
                    self.illegal(bus);
                }
            }
            Op::Sth => bus.write_u16(PROGRAM, ea, g[r2] as u16),
            Op::St => bus.write_u32(PROGRAM, ea, g[r2]),
            Op::Stc => bus.write_u8(PROGRAM, ea, g[r2] as u8),

            // === R: short immediates and SCR access ===
            Op::Ais => {
                let a = g[r2];
                g[r2] = a.wrapping_add(r3 as u32);
                self.add_flags(a, r3 as u32);
            }
            Op::Inc => g[r2] = g[r2].wrapping_add(r3 as u32),
            Op::Sis => {
                let a = g[r2];
                g[r2] = a.wrapping_sub(r3 as u32);
                self.sub_flags(a, r3 as u32);
            }
            Op::Dec => g[r2] = g[r2].wrapping_sub(r3 as u32),
            Op::Cis => {
                let diff = g[r2].wrapping_sub(r3 as u32);
                self.logical(diff);
            }
            Op::Clrsb => self.set_scr(r2, self.regs.scr[r2] & !(0x8000 >> r3)),
            Op::Setsb => self.set_scr(r2, self.regs.scr[r2] | (0x8000 >> r3)),
            Op::Mfs => {
                g[r3] = if r2 == scr::IAR { next } else { self.regs.scr[r2] };
            }
            Op::Mts => {
                let value = g[r3];
                self.set_scr(r2, value);
            }

            // === R: bit operations ===
            Op::Clrbu => {
                g[r2] &= !(0x8000_0000 >> r3);
                self.logical(self.regs.gpr[r2]);
            }
            Op::Clrbl => {
                g[r2] &= !(0x0000_8000 >> r3);
                self.logical(self.regs.gpr[r2]);
            }
            Op::Setbu => {
                g[r2] |= 0x8000_0000 >> r3;
                self.logical(self.regs.gpr[r2]);
            }
            Op::Setbl => {
                g[r2] |= 0x0000_8000 >> r3;
                self.logical(self.regs.gpr[r2]);
            }
            Op::Mftbiu | Op::Mftbil | Op::Mftb => {
                let mask = match handler {
                    Op::Mftbiu => 0x8000_0000 >> r3,
                    Op::Mftbil => 0x0000_8000 >> r3,
                    _ => 0x8000_0000 >> (g[r3] & 31),
                };
                if self.condition().test() {
                    self.regs.gpr[r2] |= mask;
                } else {
                    self.regs.gpr[r2] &= !mask;
                }
            }
            Op::Mttbiu | Op::Mttbil | Op::Mttb => {
                let mask = match handler {
                    Op::Mttbiu => 0x8000_0000 >> r3,
                    Op::Mttbil => 0x0000_8000 >> r3,
                    _ => 0x8000_0000 >> (g[r3] & 31),
                };
                let value = g[r2] & mask != 0;
                self.set_test_bit(value);
            }

            // === R: shifts ===
            Op::Sari => {
                g[r2] = sar(g[r2], r3 as u32);
                self.logical(self.regs.gpr[r2]);
            }
            Op::Sari16 => {
                g[r2] = sar(g[r2], r3 as u32 + 16);
                self.logical(self.regs.gpr[r2]);
            }
            Op::Lis => g[r2] = r3 as u32,
            Op::Sri => {
                g[r2] = shr(g[r2], r3 as u32);
                self.logical(self.regs.gpr[r2]);
            }
            Op::Sri16 => {
                g[r2] = shr(g[r2], r3 as u32 + 16);
                self.logical(self.regs.gpr[r2]);
            }
            Op::Sli => {
                g[r2] = shl(g[r2], r3 as u32);
                self.logical(self.regs.gpr[r2]);
            }
            Op::Sli16 => {
                g[r2] = shl(g[r2], r3 as u32 + 16);
                self.logical(self.regs.gpr[r2]);
            }
            Op::Srpi => {
                g[r2 ^ 1] = shr(g[r2], r3 as u32);
                self.logical(self.regs.gpr[r2 ^ 1]);
            }
            Op::Srpi16 => {
                g[r2 ^ 1] = shr(g[r2], r3 as u32 + 16);
                self.logical(self.regs.gpr[r2 ^ 1]);
            }
            Op::Slpi => {
                g[r2 ^ 1] = shl(g[r2], r3 as u32);
                self.logical(self.regs.gpr[r2 ^ 1]);
            }
            Op::Slpi16 => {
                g[r2 ^ 1] = shl(g[r2], r3 as u32 + 16);
                self.logical(self.regs.gpr[r2 ^ 1]);
            }
            Op::Sar => {
                g[r2] = sar(g[r2], g[r3] & 63);
                self.logical(self.regs.gpr[r2]);
            }
            Op::Sr => {
                g[r2] = shr(g[r2], g[r3] & 63);
                self.logical(self.regs.gpr[r2]);
            }
            Op::Srp => {
                g[r2 ^ 1] = shr(g[r2], g[r3] & 63);
                self.logical(self.regs.gpr[r2 ^ 1]);
            }
            Op::Sl => {
                g[r2] = shl(g[r2], g[r3] & 63);
                self.logical(self.regs.gpr[r2]);
            }
            Op::Slp => {
                g[r2 ^ 1] = shl(g[r2], g[r3] & 63);
                self.logical(self.regs.gpr[r2 ^ 1]);
            }

            // === R: arithmetic and logic ===
            Op::Exts => {
                g[r2] = sext16(g[r3] as u16);
                self.logical(self.regs.gpr[r2]);
            }
            Op::Sf => {
                let (a, b) = (g[r3], g[r2]);
                g[r2] = a.wrapping_sub(b);
                self.sub_flags(a, b);
            }
            Op::Cl | Op::C => {
                let diff = g[r2].wrapping_sub(g[r3]);
                self.logical(diff);
            }
            Op::Tgte | Op::Tlt => {
                let (a, b) = (g[r2], g[r3]);
                let trapped = if handler == Op::Tgte { a >= b } else { a < b };
                if trapped {
                    self.trap(bus);
                    return 14;
                }
            }
            Op::Abs => g[r2] = (g[r3] as i32).wrapping_abs() as u32,
            Op::A => {
                let (a, b) = (g[r2], g[r3]);
                g[r2] = a.wrapping_add(b);
                self.add_flags(a, b);
            }
            Op::S => {
                let (a, b) = (g[r2], g[r3]);
                g[r2] = a.wrapping_sub(b);
                self.sub_flags(a, b);
            }
            Op::O => {
                g[r2] |= g[r3];
                self.logical(self.regs.gpr[r2]);
            }
            Op::Twoc => {
                let b = g[r3];
                g[r2] = b.wrapping_neg();
                self.sub_flags(0, b);
            }
            Op::N => {
                g[r2] &= g[r3];
                self.logical(self.regs.gpr[r2]);
            }
            Op::X => {
                g[r2] ^= g[r3];
                self.logical(self.regs.gpr[r2]);
            }
            Op::Ae => {
                let a = g[r2];
                let b = g[r3].wrapping_add(self.carry_in());
                self.regs.gpr[r2] = a.wrapping_add(b);
                self.add_flags(a, b);
            }
            Op::Se => {
                let a = g[r2];
                let b = g[r3].wrapping_add(self.carry_in());
                self.regs.gpr[r2] = a.wrapping_sub(b);
                self.sub_flags(a, b);
            }
            Op::Ca16 => {
                let low = (g[r2] as u16).wrapping_add(g[r3] as u16);
                g[r2] = (g[r3] & 0xFFFF_0000) | u32::from(low);
            }
            Op::Onec => {
                g[r2] = !g[r3];
                self.logical(self.regs.gpr[r2]);
            }
            Op::Clz => g[r2] = (g[r3] as u16).leading_zeros(),

            // === R: register branches ===
            Op::Bnbr | Op::Bnbrx => {
                if !self.branch_condition(op) {
                    let target = self.regs.gpr[r3] & !1;
                    self.branch(target, handler == Op::Bnbrx);
                }
            }
            Op::Bbr | Op::Bbrx => {
                if self.branch_condition(op) {
                    let target = self.regs.gpr[r3] & !1;
                    return self.branch(target, handler == Op::Bbrx);
                }
            }
            Op::Balr => {
                g[r2] = next;
                let target = self.regs.gpr[r3] & !1;
                return self.branch(target, false);
            }
            Op::Balrx => {
                g[r2] = next.wrapping_add(4);
                let target = self.regs.gpr[r3] & !1;
                return self.branch(target, true);
            }
            Op::Lhs => {
                let at = g[r3];
                self.regs.gpr[r2] = u32::from(bus.read_u16(PROGRAM, at));
            }

            // === R: character moves ===
            Op::Mc03 => g[r2] = (g[r2] & 0x00FF_FFFF) | ((g[r3] & 0xFF) << 24),
            Op::Mc13 => g[r2] = (g[r2] & 0xFF00_FFFF) | ((g[r3] & 0xFF) << 16),
            Op::Mc23 => g[r2] = (g[r2] & 0xFFFF_00FF) | ((g[r3] & 0xFF) << 8),
            Op::Mc33 => g[r2] = (g[r2] & 0xFFFF_FF00) | (g[r3] & 0xFF),
            Op::Mc30 => g[r2] = (g[r2] & 0xFFFF_FF00) | (g[r3] >> 24),
            Op::Mc31 => g[r2] = (g[r2] & 0xFFFF_FF00) | ((g[r3] >> 16) & 0xFF),
            Op::Mc32 => g[r2] = (g[r2] & 0xFFFF_FF00) | ((g[r3] >> 8) & 0xFF),

            Op::Illegal => self.illegal(bus),
        }
        0
    }
}
