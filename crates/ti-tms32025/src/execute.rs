//! Instruction handlers.
//!
//! Each handler returns the clocks it costs beyond the table's base cost.
//! Direct operands live at `DP * 128 + op[6:0]`; indirect operands at the
//! current auxiliary register, which is then post-modified.

use emu_core::{AddressSpace, Bus};

use crate::addressing::modify_ar;
use crate::cpu::{CLK, Flow, Tms32025};
use crate::decode::Op;
use crate::interrupts::vector;

/// Data addresses from here up are off chip on both parts.
const EXTERNAL: u16 = 0x0800;

const fn indirect(op: u16) -> bool {
    op & 0x80 != 0
}

/// Shift count or register number in bits 11-8.
const fn high_nibble(op: u16) -> u32 {
    ((op >> 8) & 0xF) as u32
}

const fn ar_field(op: u16) -> usize {
    ((op >> 8) & 7) as usize
}

fn signed_product(a: u16, b: u16) -> u32 {
    (i32::from(a as i16) * i32::from(b as i16)) as u32
}

impl Tms32025 {
    fn operand_address(&self) -> u16 {
        if indirect(self.opcode) {
            self.regs.current_ar()
        } else {
            (self.regs.status.dp() << 7) | (self.opcode & 0x7F)
        }
    }

    fn fetch_operand<B: Bus>(&mut self, bus: &mut B, update_arp: bool) -> u16 {
        let address = self.operand_address();
        self.mem_address = address;
        self.external_access = address >= EXTERNAL;
        let value = self.read_data(bus, address);
        if indirect(self.opcode) {
            modify_ar(&mut self.regs, self.opcode, update_arp);
        }
        value
    }

    /// Read the data operand of the current instruction.
    fn operand<B: Bus>(&mut self, bus: &mut B) -> u16 {
        self.fetch_operand(bus, true)
    }

    /// Write the data operand of the current instruction.
    fn store<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let address = self.operand_address();
        self.mem_address = address;
        self.external_access = address >= EXTERNAL;
        self.write_data(bus, address, value);
        if indirect(self.opcode) {
            modify_ar(&mut self.regs, self.opcode, true);
        }
    }

    /// `SST`/`SST1` store: direct addresses are always on page 0 and ARP
    /// never changes.
    fn store_status<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let op = self.opcode;
        let address = if indirect(op) {
            self.regs.current_ar()
        } else {
            op & 0x7F
        };
        self.mem_address = address;
        self.external_access = address >= EXTERNAL;
        if indirect(op) {
            modify_ar(&mut self.regs, op, false);
        }
        self.write_data(bus, address, value);
    }

    /// Second instruction word.
    fn long_immediate<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let value = self.read_program(bus, self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    /// Operand widened per SXM and shifted left.
    fn extend(&self, value: u16, shift: u32) -> u32 {
        let wide = if self.regs.status.sxm() {
            i32::from(value as i16) as u32
        } else {
            u32::from(value)
        };
        wide << shift
    }

    /// P as it enters the ALU, shifted per PM.
    fn shifted_p(&self) -> u32 {
        let p = self.regs.p;
        match self.regs.status.pm() {
            0 => p,
            1 => p << 1,
            2 => p << 4,
            _ => ((p as i32) >> 6) as u32,
        }
    }

    fn overflowed(&mut self, old: u32) {
        self.regs.status.set_ov(true);
        if self.regs.status.ovm() {
            self.regs.acc = if (old as i32) < 0 {
                0x8000_0000
            } else {
                0x7FFF_FFFF
            };
        }
    }

    /// ACC += value. OV is sticky; carry is judged after saturation.
    fn add_acc(&mut self, value: u32) {
        let old = self.regs.acc;
        let acc = old.wrapping_add(value);
        self.regs.acc = acc;
        if (((acc ^ value) & (old ^ acc)) as i32) < 0 {
            self.overflowed(old);
        }
        self.regs.status.set_carry(old > self.regs.acc);
    }

    fn sub_acc(&mut self, value: u32) {
        let old = self.regs.acc;
        let acc = old.wrapping_sub(value);
        self.regs.acc = acc;
        if (((old ^ value) & (old ^ acc)) as i32) < 0 {
            self.overflowed(old);
        }
        self.regs.status.set_carry(old >= self.regs.acc);
    }

    fn branch<B: Bus>(&mut self, bus: &mut B, taken: bool) {
        if taken {
            self.regs.pc = self.read_program(bus, self.regs.pc);
        } else {
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
        modify_ar(&mut self.regs, self.opcode, true);
    }

    fn load_t_and_square<B: Bus>(&mut self, bus: &mut B) {
        let value = self.operand(bus);
        self.regs.t = value;
        self.regs.p = signed_product(value, value);
    }

    fn multiply_accumulate<B: Bus>(&mut self, bus: &mut B, move_data: bool) -> u32 {
        if self.first_pass {
            self.regs.pfc = self.long_immediate(bus);
        }
        self.add_acc(self.shifted_p());
        let value = self.operand(bus);
        if move_data && (indirect(self.opcode) || self.first_pass) {
            let next = self.mem_address.wrapping_add(1);
            self.write_data(bus, next, value);
        }
        self.regs.t = value;
        let coefficient = self.read_program(bus, self.regs.pfc);
        self.regs.p = signed_product(value, coefficient);
        self.regs.pfc = self.regs.pfc.wrapping_add(1);
        2 * CLK
    }

    fn block_move<B: Bus>(&mut self, bus: &mut B, from_program: bool) -> u32 {
        if self.first_pass {
            self.regs.pfc = self.long_immediate(bus);
        }
        let source = self.regs.pfc;
        let value = if from_program {
            self.read_program(bus, source)
        } else {
            self.read_data(bus, source)
        };
        self.store(bus, value);
        self.regs.pfc = source.wrapping_add(1);
        if from_program { 2 * CLK } else { CLK }
    }

    /// `CNFD`/`CNFP` on parts that have them: move B0.
    fn configure_b0(&mut self, program: bool) {
        if !self.model().capabilities().cnf_pair || self.regs.status.cnf0() == program {
            return;
        }
        self.ram.map_to_program(0, program);
        self.regs.status.set_cnf0(program);
    }

    /// `CONF`: select one of four block layouts via CNF1:CNF0.
    fn configure_blocks(&mut self) {
        let caps = self.model().capabilities();
        if !caps.conf {
            return;
        }
        let status = self.regs.status;
        let prev = (u16::from(status.cnf1()) << 1) | u16::from(status.cnf0());
        let next = self.opcode & 3;
        self.regs.status.set_cnf0(next & 1 != 0);
        self.regs.status.set_cnf1(next & 2 != 0);

        // Blocks leave program space when the layout drops below their
        // threshold. The matching test for entering program space repeats
        // this same condition, so blocks never enter it.
        for index in 0..caps.blocks.len() {
            let threshold = index as u16 + 1;
            if next < threshold && prev >= threshold {
                self.ram.map_to_program(index, false);
            }
        }
    }

    /// Run one handler.
    pub(crate) fn execute<B: Bus>(&mut self, bus: &mut B, handler: Op) -> u32 {
        let op = self.opcode;
        match handler {
            // === Accumulator loads and arithmetic ===
            Op::Add => {
                let value = self.operand(bus);
                self.add_acc(self.extend(value, high_nibble(op)));
            }
            Op::Sub => {
                let value = self.operand(bus);
                self.sub_acc(self.extend(value, high_nibble(op)));
            }
            Op::Lac => {
                let value = self.operand(bus);
                self.regs.acc = self.extend(value, high_nibble(op));
            }
            Op::Lact => {
                let value = self.operand(bus);
                self.regs.acc = self.extend(value, u32::from(self.regs.t & 0xF));
            }
            Op::Addt => {
                let value = self.operand(bus);
                self.add_acc(self.extend(value, u32::from(self.regs.t & 0xF)));
            }
            Op::Subt => {
                let value = self.operand(bus);
                self.sub_acc(self.extend(value, u32::from(self.regs.t & 0xF)));
            }
            Op::Adds => {
                let value = self.operand(bus);
                self.add_acc(u32::from(value));
            }
            Op::Subs => {
                let value = self.operand(bus);
                self.sub_acc(u32::from(value));
            }
            Op::Addc => {
                let old = self.regs.acc;
                let value = self.operand(bus);
                self.regs.acc = old.wrapping_add(u32::from(self.regs.status.carry()));
                self.regs.acc = self.regs.acc.wrapping_add(u32::from(value));
                let acc = self.regs.acc;
                if (((acc ^ u32::from(value)) & (old ^ acc)) as i32) < 0 {
                    self.overflowed(old);
                }
                // A full wrap leaves the carry alone.
                if self.regs.acc != old {
                    self.regs.status.set_carry(old > self.regs.acc);
                }
            }
            Op::Subb => {
                let old = self.regs.acc;
                let value = self.operand(bus);
                self.regs.acc = old.wrapping_sub(u32::from(!self.regs.status.carry()));
                self.regs.acc = self.regs.acc.wrapping_sub(u32::from(value));
                let acc = self.regs.acc;
                if (((old ^ u32::from(value)) & (old ^ acc)) as i32) < 0 {
                    self.overflowed(old);
                }
                if self.regs.acc != old {
                    self.regs.status.set_carry(old >= self.regs.acc);
                }
            }
            Op::Addh => {
                let value = self.operand(bus);
                let old = (self.regs.acc >> 16) as u16;
                let mut high = old.wrapping_add(value);
                // Carry is only ever set here.
                if old > high {
                    self.regs.status.set_carry(true);
                }
                if (((high ^ value) & (old ^ high)) as i16) < 0 {
                    self.regs.status.set_ov(true);
                    if self.regs.status.ovm() {
                        high = if (old as i16) < 0 { 0x8000 } else { 0x7FFF };
                    }
                }
                self.regs.acc = (u32::from(high) << 16) | (self.regs.acc & 0xFFFF);
            }
            Op::Subh => {
                let value = self.operand(bus);
                let old = (self.regs.acc >> 16) as u16;
                let mut high = old.wrapping_sub(value);
                // Carry is only ever cleared here.
                if old < high {
                    self.regs.status.set_carry(false);
                }
                if (((old ^ value) & (old ^ high)) as i16) < 0 {
                    self.regs.status.set_ov(true);
                    if self.regs.status.ovm() {
                        high = if (old as i16) < 0 { 0x8000 } else { 0x7FFF };
                    }
                }
                self.regs.acc = (u32::from(high) << 16) | (self.regs.acc & 0xFFFF);
            }
            Op::Subc => {
                let old = self.regs.acc;
                let value = self.operand(bus);
                let divisor = self.extend(value, 15);
                let diff = old.wrapping_sub(divisor);
                // OVM does not saturate a division step.
                if (((old ^ divisor) & (old ^ diff)) as i32) < 0 {
                    self.regs.status.set_ov(true);
                }
                self.regs.status.set_carry(old >= diff);
                self.regs.acc = if old >= divisor {
                    (diff << 1) | 1
                } else {
                    old << 1
                };
            }
            Op::Zalh => {
                let value = self.operand(bus);
                self.regs.acc = u32::from(value) << 16;
            }
            Op::Zals => {
                let value = self.operand(bus);
                self.regs.acc = u32::from(value);
            }
            Op::Zalr => {
                let value = self.operand(bus);
                self.regs.acc = (u32::from(value) << 16) | 0x8000;
            }
            Op::Xor => {
                let value = self.operand(bus);
                self.regs.acc ^= u32::from(value);
            }
            Op::Or => {
                let value = self.operand(bus);
                self.regs.acc |= u32::from(value);
            }
            Op::And => {
                let value = self.operand(bus);
                self.regs.acc &= u32::from(value);
            }
            Op::Lack => self.regs.acc = u32::from(op & 0xFF),
            Op::Addk => self.add_acc(u32::from(op & 0xFF)),
            Op::Subk => self.sub_acc(u32::from(op & 0xFF)),

            Op::Abs => {
                if (self.regs.acc as i32) < 0 {
                    self.regs.acc = self.regs.acc.wrapping_neg();
                    if self.regs.acc == 0x8000_0000 {
                        self.regs.status.set_ov(true);
                        if self.regs.status.ovm() {
                            self.regs.acc = 0x7FFF_FFFF;
                        }
                    }
                }
                self.regs.status.set_carry(false);
            }
            Op::Neg => {
                if self.regs.acc == 0x8000_0000 {
                    self.regs.status.set_ov(true);
                    if self.regs.status.ovm() {
                        self.regs.acc = 0x7FFF_FFFF;
                    }
                } else {
                    self.regs.acc = self.regs.acc.wrapping_neg();
                }
                self.regs.status.set_carry(self.regs.acc == 0);
            }
            Op::Cmpl => self.regs.acc = !self.regs.acc,
            Op::Sfl => {
                self.regs.status.set_carry(self.regs.acc & 0x8000_0000 != 0);
                self.regs.acc <<= 1;
            }
            Op::Sfr => {
                let acc = self.regs.acc;
                self.regs.status.set_carry(acc & 1 != 0);
                self.regs.acc = if self.regs.status.sxm() {
                    ((acc as i32) >> 1) as u32
                } else {
                    acc >> 1
                };
            }
            Op::Rol => {
                let acc = self.regs.acc;
                self.regs.acc = (acc << 1) | u32::from(self.regs.status.carry());
                self.regs.status.set_carry(acc & 0x8000_0000 != 0);
            }
            Op::Ror => {
                let acc = self.regs.acc;
                let carry_in = u32::from(self.regs.status.carry()) << 31;
                self.regs.acc = (acc >> 1) | carry_in;
                self.regs.status.set_carry(acc & 1 != 0);
            }
            Op::Norm => {
                let acc = self.regs.acc;
                if acc != 0 && ((acc ^ (acc << 1)) as i32) >= 0 {
                    self.regs.status.set_tc(false);
                    self.regs.acc = acc << 1;
                    modify_ar(&mut self.regs, op, true);
                } else {
                    self.regs.status.set_tc(true);
                }
            }

            // === Long immediates ===
            Op::Lalk => {
                let value = self.long_immediate(bus);
                self.regs.acc = self.extend(value, high_nibble(op));
            }
            Op::Adlk => {
                let value = self.long_immediate(bus);
                self.add_acc(self.extend(value, high_nibble(op)));
            }
            Op::Sblk => {
                let value = self.long_immediate(bus);
                self.sub_acc(self.extend(value, high_nibble(op)));
            }
            Op::Andk => {
                let value = self.long_immediate(bus);
                self.regs.acc &= u32::from(value) << high_nibble(op);
            }
            Op::Ork => {
                let value = self.long_immediate(bus);
                self.regs.acc |= u32::from(value) << high_nibble(op);
            }
            Op::Xork => {
                let value = self.long_immediate(bus);
                self.regs.acc ^= u32::from(value) << high_nibble(op);
            }
            Op::Lrlk => {
                let value = self.long_immediate(bus);
                self.regs.ar[ar_field(op)] = value;
            }

            // === Multiplier ===
            Op::Lt => self.regs.t = self.operand(bus),
            Op::Lta => {
                self.regs.t = self.operand(bus);
                self.add_acc(self.shifted_p());
            }
            Op::Lts => {
                self.regs.t = self.operand(bus);
                self.sub_acc(self.shifted_p());
            }
            Op::Ltp => {
                self.regs.t = self.operand(bus);
                self.regs.acc = self.shifted_p();
            }
            Op::Ltd => {
                let value = self.operand(bus);
                self.regs.t = value;
                let next = self.mem_address.wrapping_add(1);
                self.write_data(bus, next, value);
                self.add_acc(self.shifted_p());
            }
            Op::Mpy => {
                let value = self.operand(bus);
                self.regs.p = signed_product(value, self.regs.t);
            }
            Op::Mpya => {
                self.add_acc(self.shifted_p());
                let value = self.operand(bus);
                self.regs.p = signed_product(value, self.regs.t);
            }
            Op::Mpys => {
                self.sub_acc(self.shifted_p());
                let value = self.operand(bus);
                self.regs.p = signed_product(value, self.regs.t);
            }
            Op::Mpyu => {
                let value = self.operand(bus);
                self.regs.p = u32::from(value) * u32::from(self.regs.t);
            }
            Op::Mpyk => {
                let k = ((op << 3) as i16) >> 3;
                self.regs.p = (i32::from(self.regs.t as i16) * i32::from(k)) as u32;
            }
            Op::Sqra => {
                self.add_acc(self.shifted_p());
                self.load_t_and_square(bus);
            }
            Op::Sqrs => {
                self.sub_acc(self.shifted_p());
                self.load_t_and_square(bus);
            }
            Op::Mac => return self.multiply_accumulate(bus, false),
            Op::Macd => return self.multiply_accumulate(bus, true),
            Op::Pac => self.regs.acc = self.shifted_p(),
            Op::Apac => self.add_acc(self.shifted_p()),
            Op::Spac => self.sub_acc(self.shifted_p()),
            Op::Lph => {
                let value = self.operand(bus);
                self.regs.p = (u32::from(value) << 16) | (self.regs.p & 0xFFFF);
            }
            Op::Spl => self.store(bus, self.shifted_p() as u16),
            Op::Sph => self.store(bus, (self.shifted_p() >> 16) as u16),
            Op::Spm => self.regs.status.set_pm(op & 3),

            // === Stores and data moves ===
            Op::Sacl => {
                let value = self.regs.acc << ((op >> 8) & 7);
                self.store(bus, value as u16);
            }
            Op::Sach => {
                let value = self.regs.acc << ((op >> 8) & 7);
                self.store(bus, (value >> 16) as u16);
            }
            Op::Sar => self.store(bus, self.regs.ar[ar_field(op)]),
            Op::Sst => self.store_status(bus, self.regs.status.st0()),
            Op::Sst1 => self.store_status(bus, self.regs.status.st1()),
            Op::Dmov => {
                let value = self.operand(bus);
                let next = self.mem_address.wrapping_add(1);
                self.write_data(bus, next, value);
            }
            Op::Blkd => return self.block_move(bus, false),
            Op::Blkp => return self.block_move(bus, true),
            Op::Tblr => {
                if self.first_pass {
                    self.regs.pfc = self.regs.acc as u16;
                }
                let source = self.regs.pfc;
                let value = self.read_program(bus, source);
                // Free when a mapped block serves the source. No '26 block
                // reaches program space (see `configure_blocks`), so the '26
                // always pays.
                let extra = if self.ram.is_on_chip_program(source) {
                    0
                } else {
                    CLK
                };
                self.store(bus, value);
                self.regs.pfc = source.wrapping_add(1);
                return extra;
            }
            Op::Tblw => {
                if self.first_pass {
                    self.regs.pfc = self.regs.acc as u16;
                }
                let value = self.operand(bus);
                let extra = if self.external_access { 2 * CLK } else { CLK };
                let target = self.regs.pfc;
                self.write_program(bus, target, value);
                self.regs.pfc = target.wrapping_add(1);
                return extra;
            }
            Op::In => {
                let port = high_nibble(op) << 1;
                let value = bus.read_u16(AddressSpace::Io, port);
                self.store(bus, value);
            }
            Op::Out => {
                let value = self.operand(bus);
                bus.write_u16(AddressSpace::Io, high_nibble(op) << 1, value);
            }

            // === Auxiliary registers and pages ===
            Op::Lar => {
                let value = self.operand(bus);
                self.regs.ar[ar_field(op)] = value;
            }
            Op::Lark => self.regs.ar[ar_field(op)] = op & 0xFF,
            Op::Adrk => {
                let ar = self.regs.current_ar_mut();
                *ar = ar.wrapping_add(op & 0xFF);
            }
            Op::Sbrk => {
                let ar = self.regs.current_ar_mut();
                *ar = ar.wrapping_sub(op & 0xFF);
            }
            Op::Mar => {
                if indirect(op) {
                    modify_ar(&mut self.regs, op, true);
                }
            }
            Op::Cmpr => {
                let (ar, ar0) = (self.regs.current_ar(), self.regs.ar[0]);
                let tc = match op & 3 {
                    0 => ar == ar0,
                    1 => ar < ar0,
                    2 => ar > ar0,
                    _ => ar != ar0,
                };
                self.regs.status.set_tc(tc);
            }
            Op::Ldp => {
                let value = self.operand(bus);
                self.regs.status.set_dp(value);
            }
            Op::Ldpk => self.regs.status.set_dp(op),

            // === Bit tests ===
            Op::Bit => {
                let value = self.operand(bus);
                self.regs.status.set_tc(value & (0x8000 >> high_nibble(op)) != 0);
            }
            Op::Bitt => {
                let value = self.operand(bus);
                self.regs.status.set_tc(value & (0x8000 >> (self.regs.t & 0xF)) != 0);
            }

            // === Status ===
            Op::Lst => {
                let value = self.fetch_operand(bus, false);
                self.regs.status.load_st0(value);
            }
            Op::Lst1 => {
                let value = self.fetch_operand(bus, false);
                self.regs.status.load_st1(value);
            }
            Op::Eint => self.regs.status.set_intm(false),
            Op::Dint => self.regs.status.set_intm(true),
            Op::Rovm => self.regs.status.set_ovm(false),
            Op::Sovm => self.regs.status.set_ovm(true),
            Op::Rsxm => self.regs.status.set_sxm(false),
            Op::Ssxm => self.regs.status.set_sxm(true),
            Op::Rc => self.regs.status.set_carry(false),
            Op::Sc => self.regs.status.set_carry(true),
            Op::Rtc => self.regs.status.set_tc(false),
            Op::Stc => self.regs.status.set_tc(true),
            Op::Rhm => self.regs.status.set_hm(false),
            Op::Shm => self.regs.status.set_hm(true),
            Op::Rfsm => self.regs.status.set_fsm(false),
            Op::Sfsm => self.regs.status.set_fsm(true),
            Op::Rtxm => self.regs.status.set_txm(false),
            Op::Stxm => self.regs.status.set_txm(true),
            Op::Fort => self.regs.status.set_fo(op & 1 != 0),
            Op::Rxf => {
                self.regs.status.set_xf(false);
                self.xf_pin = false;
            }
            Op::Sxf => {
                self.regs.status.set_xf(true);
                self.xf_pin = true;
            }
            Op::Cnfd => self.configure_b0(false),
            Op::Cnfp => self.configure_b0(true),
            Op::Conf => self.configure_blocks(),

            // === Stack ===
            Op::Push => self.regs.push(self.regs.acc as u16),
            Op::Pop => self.regs.acc = u32::from(self.regs.pop()),
            Op::Pshd => {
                let value = self.operand(bus);
                self.regs.push(value);
            }
            Op::Popd => {
                let value = self.regs.pop();
                self.store(bus, value);
            }

            // === Repeat ===
            Op::Rpt => {
                self.regs.rptc = self.operand(bus) as u8;
                self.flow = Flow::RepeatBlock;
            }
            Op::Rptk => {
                self.regs.rptc = op as u8;
                self.flow = Flow::RepeatBlock;
            }

            // === Branches ===
            Op::B => self.branch(bus, true),
            Op::Bc => self.branch(bus, self.regs.status.carry()),
            Op::Bnc => self.branch(bus, !self.regs.status.carry()),
            Op::Bz => self.branch(bus, self.regs.acc == 0),
            Op::Bnz => self.branch(bus, self.regs.acc != 0),
            Op::Bgz => self.branch(bus, (self.regs.acc as i32) > 0),
            Op::Bgez => self.branch(bus, (self.regs.acc as i32) >= 0),
            Op::Blz => self.branch(bus, (self.regs.acc as i32) < 0),
            Op::Blez => self.branch(bus, (self.regs.acc as i32) <= 0),
            Op::Bbz => self.branch(bus, !self.regs.status.tc()),
            Op::Bbnz => self.branch(bus, self.regs.status.tc()),
            Op::Bioz => self.branch(bus, self.bio),
            Op::Banz => self.branch(bus, self.regs.current_ar() != 0),
            // Both overflow branches leave OV clear.
            Op::Bv => {
                self.branch(bus, self.regs.status.ov());
                self.regs.status.set_ov(false);
            }
            Op::Bnv => {
                self.branch(bus, !self.regs.status.ov());
                self.regs.status.set_ov(false);
            }
            Op::Call => {
                let target_at = self.regs.pc;
                self.regs.pc = target_at.wrapping_add(1);
                self.regs.push(self.regs.pc);
                self.regs.pc = self.read_program(bus, target_at);
                modify_ar(&mut self.regs, op, true);
            }
            Op::Cala => {
                self.regs.push(self.regs.pc);
                self.regs.pc = self.regs.acc as u16;
            }
            Op::Bacc => self.regs.pc = self.regs.acc as u16,
            Op::Ret => self.regs.pc = self.regs.pop(),
            Op::Trap => {
                self.regs.push(self.regs.pc);
                self.regs.pc = vector::TRAP;
            }
            Op::Idle => {
                self.regs.status.set_intm(false);
                self.idle = true;
                tracing::trace!(pc = self.prev_pc, "idle");
            }

            Op::Illegal => {
                tracing::warn!(pc = self.prev_pc, opcode = op, "illegal instruction");
            }
        }
        0
    }
}
