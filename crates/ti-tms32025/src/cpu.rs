//! TMS3202x core: run loop, repeat blocks, pins and host surfaces.
//!
//! Budgets are counted in input clocks. One machine cycle is [`CLK`]
//! clocks; the on-chip timer ticks once per machine cycle.

use emu_core::{Bus, Cpu, CycleBudget, LineState, Observable, StateError, Value};

use crate::decode::decode;
use crate::interrupts::{ifr, line};
use crate::memory::OnChipRam;
use crate::model::Model;
use crate::registers::Registers;
use crate::status::{self, Status};

/// Input clocks per machine cycle.
pub const CLK: u32 = 4;

/// Sequencing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Flow {
    #[default]
    Normal,
    /// `RPT`/`RPTK` armed: the next instruction runs RPTC + 1 times from a
    /// single fetch.
    RepeatBlock,
}

/// Everything needed to resume a core, for save states.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tms32025State {
    pub model: Model,
    pub regs: Registers,
    pub ram: OnChipRam,
    pub flow: Flow,
    pub first_pass: bool,
    pub opcode: u16,
    pub prev_pc: u16,
    pub mem_address: u16,
    pub external_access: bool,
    pub idle: bool,
    pub hold: bool,
    pub xf_pin: bool,
    pub waiting_for_frame: bool,
    pub timer_phase: u32,
    pub total_cycles: u64,
}

/// TI TMS32025 / TMS32026 DSP.
#[derive(Debug, Clone)]
pub struct Tms32025 {
    model: Model,

    // === Registers ===
    pub regs: Registers,
    pub(crate) ram: OnChipRam,

    // === Sequencing ===
    pub(crate) flow: Flow,
    /// Clear on the second and later passes of a repeat block.
    pub(crate) first_pass: bool,
    /// Last fetched instruction word.
    pub(crate) opcode: u16,
    pub(crate) prev_pc: u16,
    /// Data address of the last operand fetch.
    pub(crate) mem_address: u16,
    /// The last operand access went off chip.
    pub(crate) external_access: bool,
    pub(crate) idle: bool,

    // === Pins ===
    pub(crate) bio: bool,
    hold_line: bool,
    /// HOLDA, asserted while the core honours a hold request.
    hold: bool,
    pub(crate) xf_pin: bool,
    pub(crate) serial_in: u16,
    pub(crate) serial_out: Vec<u16>,
    pub(crate) waiting_for_frame: bool,

    // === Timing ===
    /// Clocks into the current timer tick.
    pub(crate) timer_phase: u32,
    pub(crate) total_cycles: u64,
}

impl Default for Tms32025 {
    fn default() -> Self {
        Self::new(Model::default())
    }
}

impl Tms32025 {
    /// Create a core in its reset state.
    #[must_use]
    pub fn new(model: Model) -> Self {
        let caps = model.capabilities();
        Self {
            model,
            regs: Registers::new(caps.st1_fixed),
            ram: OnChipRam::new(model),
            flow: Flow::Normal,
            first_pass: true,
            opcode: 0,
            prev_pc: 0,
            mem_address: 0,
            external_access: false,
            idle: false,
            bio: false,
            hold_line: false,
            hold: false,
            xf_pin: true,
            serial_in: 0,
            serial_out: Vec::new(),
            waiting_for_frame: false,
            timer_phase: 0,
            total_cycles: 0,
        }
    }

    #[must_use]
    pub const fn model(&self) -> Model {
        self.model
    }

    /// On-chip RAM and memory-mapped registers.
    #[must_use]
    pub const fn ram(&self) -> &OnChipRam {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut OnChipRam {
        &mut self.ram
    }

    #[must_use]
    pub const fn status(&self) -> Status {
        self.regs.status
    }

    #[must_use]
    pub const fn flow(&self) -> Flow {
        self.flow
    }

    /// True while IDLE waits for an interrupt.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.idle
    }

    /// Clocks consumed since creation.
    #[must_use]
    pub const fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    // === Pins ===

    /// BIO input, tested by `BIOZ`.
    pub fn set_bio(&mut self, state: LineState) {
        self.bio = state.is_asserted();
    }

    /// HOLD input. Sampled at the start of every `run`.
    pub fn set_hold(&mut self, state: LineState) {
        self.hold_line = state.is_asserted();
    }

    /// HOLDA output.
    #[must_use]
    pub const fn hold_acknowledged(&self) -> bool {
        self.hold
    }

    /// XF output, driven by `SXF`/`RXF`.
    #[must_use]
    pub const fn xf(&self) -> bool {
        self.xf_pin
    }

    /// Word latched into DRR when RINT is serviced.
    pub fn set_serial_input(&mut self, word: u16) {
        self.serial_in = word;
    }

    /// Drain the words sent from DXR on XINT service.
    pub fn take_serial_output(&mut self) -> Vec<u16> {
        std::mem::take(&mut self.serial_out)
    }

    // === Execution ===

    /// Service a pending interrupt if one is due, then fetch and execute
    /// one instruction, including a whole repeat block when the
    /// instruction arms one. Returns the clocks used. The timer is not
    /// advanced; `run` does that.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let mut clocks = 0;
        if self.regs.ifr != 0 {
            clocks += self.service_interrupts();
        }

        self.prev_pc = self.regs.pc;
        self.opcode = self.fetch(bus);
        let entry = decode(self.opcode);
        clocks += u32::from(entry.cycles) * CLK;
        clocks += self.execute(bus, entry.handler);

        if self.flow == Flow::RepeatBlock {
            clocks += self.repeat(bus);
        }
        clocks
    }

    fn fetch<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let op = self.read_program(bus, self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        op
    }

    /// Run the instruction after `RPT`/`RPTK` until RPTC passes zero.
    /// Every pass costs one machine cycle plus the handler's extras.
    fn repeat<B: Bus>(&mut self, bus: &mut B) -> u32 {
        self.prev_pc = self.regs.pc;
        self.opcode = self.fetch(bus);
        let handler = decode(self.opcode).handler;
        tracing::trace!(opcode = self.opcode, count = self.regs.rptc, "repeat");

        let mut clocks = CLK;
        loop {
            clocks += CLK + self.execute(bus, handler);
            self.first_pass = false;
            self.regs.rptc = self.regs.rptc.wrapping_sub(1);
            if self.regs.rptc as i8 == -1 {
                break;
            }
        }

        self.regs.rptc = 0;
        self.regs.pfc = self.regs.pc;
        self.first_pass = true;
        self.flow = Flow::Normal;
        clocks
    }

    fn sample_hold(&mut self, budget: &mut CycleBudget) {
        if self.hold_line {
            if !self.hold {
                tracing::debug!(pc = self.regs.pc, "hold acknowledged");
            }
            self.hold = true;
            if self.regs.status.hm() || self.external_access {
                self.stall(budget);
            }
        } else if self.hold {
            tracing::debug!(pc = self.regs.pc, "hold released");
            self.hold = false;
            self.advance_timer(budget, 3);
        }
    }

    /// Let the rest of the budget pass without executing. The timer keeps
    /// counting.
    fn stall(&mut self, budget: &mut CycleBudget) {
        while !budget.is_exhausted() {
            let clocks = remaining_clocks(budget);
            self.advance_timer(budget, clocks);
        }
    }

    fn burn_idle(&mut self, budget: &mut CycleBudget) {
        while self.idle && !budget.is_exhausted() {
            let clocks = remaining_clocks(budget);
            self.advance_timer(budget, clocks);
        }
    }

    // === Save states ===

    /// Capture everything needed to resume later.
    #[must_use]
    pub fn snapshot(&self) -> Tms32025State {
        Tms32025State {
            model: self.model,
            regs: self.regs,
            ram: self.ram.clone(),
            flow: self.flow,
            first_pass: self.first_pass,
            opcode: self.opcode,
            prev_pc: self.prev_pc,
            mem_address: self.mem_address,
            external_access: self.external_access,
            idle: self.idle,
            hold: self.hold,
            xf_pin: self.xf_pin,
            waiting_for_frame: self.waiting_for_frame,
            timer_phase: self.timer_phase,
            total_cycles: self.total_cycles,
        }
    }

    /// Resume from a snapshot, switching model if it differs. A state whose
    /// timer phase or RAM shape cannot occur on its model is refused and
    /// the core is left untouched.
    pub fn restore(&mut self, state: &Tms32025State) -> Result<(), StateError> {
        if state.timer_phase >= CLK {
            return Err(StateError::mismatch("timer_phase", "0..CLK"));
        }
        if !state.ram.fits(state.model) {
            return Err(StateError::mismatch("ram", "the model's block layout"));
        }

        self.model = state.model;
        self.regs = state.regs;
        self.ram = state.ram.clone();
        self.flow = state.flow;
        self.first_pass = state.first_pass;
        self.opcode = state.opcode;
        self.prev_pc = state.prev_pc;
        self.mem_address = state.mem_address;
        self.external_access = state.external_access;
        self.idle = state.idle;
        self.hold = state.hold;
        self.xf_pin = state.xf_pin;
        self.waiting_for_frame = state.waiting_for_frame;
        self.timer_phase = state.timer_phase;
        self.total_cycles = state.total_cycles;
        Ok(())
    }
}

fn remaining_clocks(budget: &CycleBudget) -> u32 {
    u32::try_from(budget.remaining()).unwrap_or(u32::MAX)
}

impl Cpu for Tms32025 {
    type Registers = Registers;

    fn run<B: Bus>(&mut self, bus: &mut B, budget: &mut CycleBudget) {
        self.sample_hold(budget);

        if self.idle && self.regs.ifr != 0 && !budget.is_exhausted() {
            let clocks = self.service_interrupts();
            self.consume(budget, clocks);
        }
        self.burn_idle(budget);

        while !budget.is_exhausted() {
            let clocks = self.step(bus);
            self.advance_timer(budget, clocks);
            self.burn_idle(budget);

            if self.hold && (self.external_access || self.regs.status.hm()) {
                self.stall(budget);
            }
        }
    }

    fn reset<B: Bus>(&mut self, _bus: &mut B) {
        let caps = self.model.capabilities();
        self.regs = Registers::new(caps.st1_fixed);
        self.ram.reset();
        self.flow = Flow::Normal;
        self.first_pass = true;
        self.opcode = 0;
        self.prev_pc = 0;
        self.mem_address = 0;
        self.external_access = false;
        self.idle = false;
        self.hold = false;
        self.xf_pin = true;
        self.waiting_for_frame = false;
        self.timer_phase = 0;
    }

    /// Lines 0-5 latch the matching IFR bit; releasing a line has no
    /// effect. Line 6 is the serial frame sync.
    fn set_input_line(&mut self, irq: u8, state: LineState) {
        if !state.is_asserted() {
            return;
        }
        if irq == line::FSX {
            if self.waiting_for_frame {
                self.waiting_for_frame = false;
                self.regs.ifr |= ifr::XINT;
            }
        } else if irq <= line::XINT {
            tracing::trace!(line = irq, "interrupt request");
            self.regs.ifr |= 1 << irq;
        }
    }

    fn pc(&self) -> u32 {
        u32::from(self.regs.pc)
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn flags_string(&self) -> String {
        self.regs.status.to_string()
    }
}

/// All query paths supported by the TMS3202x.
const TMS32025_QUERY_PATHS: &[&str] = &[
    "pc", "pfc", "st0", "st1", "ifr", "imr", "rptc", "acc", "p", "t", "ar0", "ar1", "ar2", "ar3",
    "ar4", "ar5", "ar6", "ar7", "stk0", "stk1", "stk2", "stk3", "stk4", "stk5", "stk6", "stk7",
    "drr", "dxr", "tim", "prd", "greg", "arp", "arb", "dp", "pm", "flags.ov", "flags.ovm",
    "flags.intm", "flags.cnf0", "flags.cnf1", "flags.tc", "flags.sxm", "flags.c", "flags.hm",
    "flags.fsm", "flags.xf", "flags.fo", "flags.txm", "idle", "hold", "repeating", "cycles",
];

fn indexed(path: &str, prefix: &str) -> Option<usize> {
    let n: usize = path.strip_prefix(prefix)?.parse().ok()?;
    (n < 8).then_some(n)
}

impl Tms32025 {
    fn flag(&self, name: &str) -> Option<bool> {
        let s = self.regs.status;
        Some(match name {
            "ov" => s.ov(),
            "ovm" => s.ovm(),
            "intm" => s.intm(),
            "cnf0" => s.cnf0(),
            "cnf1" => s.cnf1(),
            "tc" => s.tc(),
            "sxm" => s.sxm(),
            "c" => s.carry(),
            "hm" => s.hm(),
            "fsm" => s.fsm(),
            "xf" => s.xf(),
            "fo" => s.fo(),
            "txm" => s.txm(),
            _ => return None,
        })
    }

    fn poke_flag(&mut self, path: &str, name: &str, value: &Value) -> Result<(), StateError> {
        let on = value
            .as_bool()
            .ok_or_else(|| StateError::mismatch(path, "bool"))?;
        let s = &mut self.regs.status;
        match name {
            "ov" => s.set_ov(on),
            "ovm" => s.set_ovm(on),
            "intm" => s.set_intm(on),
            "tc" => s.set_tc(on),
            "sxm" => s.set_sxm(on),
            "c" => s.set_carry(on),
            "hm" => s.set_hm(on),
            "fsm" => s.set_fsm(on),
            "xf" => s.set_xf(on),
            "fo" => s.set_fo(on),
            "txm" => s.set_txm(on),
            // Moving RAM blocks needs CNFD/CNFP/CONF.
            "cnf0" | "cnf1" => return Err(StateError::ReadOnly(path.to_string())),
            _ => return Err(StateError::UnknownPath(path.to_string())),
        }
        Ok(())
    }
}

impl Observable for Tms32025 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(n) = indexed(path, "ar") {
            return Some(self.regs.ar[n].into());
        }
        if let Some(n) = indexed(path, "stk") {
            return Some(self.regs.stack[n].into());
        }
        if let Some(name) = path.strip_prefix("flags.") {
            return self.flag(name).map(Value::from);
        }
        let s = self.regs.status;
        Some(match path {
            "pc" => self.regs.pc.into(),
            "pfc" => self.regs.pfc.into(),
            "st0" => s.st0().into(),
            "st1" => s.st1().into(),
            "ifr" => self.regs.ifr.into(),
            "imr" => self.ram.imr.into(),
            "rptc" => self.regs.rptc.into(),
            "acc" => self.regs.acc.into(),
            "p" => self.regs.p.into(),
            "t" => self.regs.t.into(),
            "drr" => self.ram.drr.into(),
            "dxr" => self.ram.dxr.into(),
            "tim" => self.ram.tim.into(),
            "prd" => self.ram.prd.into(),
            "greg" => self.ram.greg.into(),
            "arp" => (s.arp() as u8).into(),
            "arb" => (s.arb() as u8).into(),
            "dp" => s.dp().into(),
            "pm" => (s.pm() as u8).into(),
            "idle" => self.idle.into(),
            "hold" => self.hold.into(),
            "repeating" => (self.flow == Flow::RepeatBlock).into(),
            "cycles" => self.total_cycles.into(),
            _ => return None,
        })
    }

    fn query_paths(&self) -> &'static [&'static str] {
        TMS32025_QUERY_PATHS
    }

    fn poke(&mut self, path: &str, value: Value) -> Result<(), StateError> {
        if let Some(n) = indexed(path, "ar") {
            self.regs.ar[n] = value.to_register(path)?;
            return Ok(());
        }
        if let Some(n) = indexed(path, "stk") {
            self.regs.stack[n] = value.to_register(path)?;
            return Ok(());
        }
        if let Some(name) = path.strip_prefix("flags.") {
            return self.poke_flag(path, name, &value);
        }
        match path {
            "pc" => self.regs.pc = value.to_register(path)?,
            "pfc" => self.regs.pfc = value.to_register(path)?,
            "st0" => {
                let st1 = self.regs.status.st1();
                self.regs.status.set_raw(value.to_register(path)?, st1);
            }
            // The RAM layout bits only change through CNFD/CNFP/CONF.
            "st1" => {
                let (st0, st1) = (self.regs.status.st0(), self.regs.status.st1());
                let raw: u16 = value.to_register(path)?;
                let layout = status::CNF0 | status::CNF1;
                self.regs.status.set_raw(st0, (raw & !layout) | (st1 & layout));
            }
            "ifr" => self.regs.ifr = value.to_register::<u16>(path)? & ifr::ALL,
            "imr" => self.ram.imr = value.to_register(path)?,
            "rptc" => self.regs.rptc = value.to_register(path)?,
            "acc" => self.regs.acc = value.to_register(path)?,
            "p" => self.regs.p = value.to_register(path)?,
            "t" => self.regs.t = value.to_register(path)?,
            "drr" => self.ram.drr = value.to_register(path)?,
            "dxr" => self.ram.dxr = value.to_register(path)?,
            "tim" => self.ram.tim = value.to_register(path)?,
            "prd" => self.ram.prd = value.to_register(path)?,
            "greg" => self.ram.greg = value.to_register(path)?,
            "arp" => {
                let n: u8 = value.to_register(path)?;
                if n > 7 {
                    return Err(StateError::mismatch(path, "0..=7"));
                }
                self.regs.status.set_arp(usize::from(n));
            }
            "dp" => self.regs.status.set_dp(value.to_register(path)?),
            "pm" => self.regs.status.set_pm(value.to_register(path)?),
            "arb" | "idle" | "hold" | "repeating" | "cycles" => {
                return Err(StateError::ReadOnly(path.to_string()));
            }
            _ => return Err(StateError::UnknownPath(path.to_string())),
        }
        Ok(())
    }
}
