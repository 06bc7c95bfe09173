//! On-chip memory and the data/program address decoders.
//!
//! Data space:
//!
//! | Words | Contents |
//! |---|---|
//! | 0-5 | memory-mapped registers, see [`mmr`] |
//! | 0x60-0x7F | block B2 |
//! | model specific | B0, B1 (and B3) while configured as data |
//!
//! A block configured as program memory answers in its program window
//! instead, and its data window falls through to the bus. Every other
//! address goes to the [`Bus`] at byte address `word << 1`.

use emu_core::{AddressSpace, Bus};

use crate::cpu::Tms32025;
use crate::interrupts::ifr;
use crate::model::Model;

/// Memory-mapped register addresses in data space.
pub mod mmr {
    /// Serial receive data.
    pub const DRR: u16 = 0;
    /// Serial transmit data.
    pub const DXR: u16 = 1;
    /// Timer counter.
    pub const TIM: u16 = 2;
    /// Timer period.
    pub const PRD: u16 = 3;
    /// Interrupt mask.
    pub const IMR: u16 = 4;
    /// Global memory allocation.
    pub const GREG: u16 = 5;
}

const B2_BASE: u16 = 0x0060;
const B2_SIZE: usize = 32;

/// On-chip RAM blocks and peripheral registers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OnChipRam {
    model: Model,
    b2: [u16; B2_SIZE],
    /// Configurable blocks in the order of [`crate::Capabilities::blocks`].
    blocks: Vec<Vec<u16>>,
    in_program: Vec<bool>,

    // === Memory-mapped registers ===
    pub drr: u16,
    pub dxr: u16,
    pub tim: u16,
    pub prd: u16,
    pub imr: u16,
    pub greg: u16,
}

impl OnChipRam {
    /// Zeroed RAM with every block in data space.
    #[must_use]
    pub fn new(model: Model) -> Self {
        let layout = model.capabilities().blocks;
        Self {
            model,
            b2: [0; B2_SIZE],
            blocks: layout
                .iter()
                .map(|block| vec![0; usize::from(block.size)])
                .collect(),
            in_program: vec![false; layout.len()],
            drr: 0,
            dxr: 0,
            tim: 0xFFFF,
            prd: 0xFFFF,
            imr: 0xFFC0,
            greg: 0,
        }
    }

    /// Reset values of the peripheral registers. Every block returns to
    /// data space; RAM contents are kept.
    pub fn reset(&mut self) {
        for index in 0..self.in_program.len() {
            self.map_to_program(index, false);
        }
        self.greg = 0;
        self.tim = 0xFFFF;
        self.prd = 0xFFFF;
        self.imr = 0xFFC0;
    }

    /// True when block `index` is configured as program memory.
    #[must_use]
    pub fn is_program(&self, index: usize) -> bool {
        self.in_program.get(index).copied().unwrap_or(false)
    }

    /// Move block `index` into program space (`true`) or data space.
    pub fn map_to_program(&mut self, index: usize, program: bool) {
        let Some(slot) = self.in_program.get_mut(index) else {
            return;
        };
        if *slot != program {
            let block = self.model.capabilities().blocks[index];
            tracing::debug!(
                block = block.name,
                space = if program { "program" } else { "data" },
                "on-chip RAM remap"
            );
        }
        *slot = program;
    }

    /// True when the block storage has the shape `model` lays out.
    #[must_use]
    pub fn fits(&self, model: Model) -> bool {
        let layout = model.capabilities().blocks;
        self.model == model
            && self.in_program.len() == layout.len()
            && self.blocks.len() == layout.len()
            && self
                .blocks
                .iter()
                .zip(layout)
                .all(|(block, expected)| block.len() == usize::from(expected.size))
    }

    fn data_cell(&self, address: u16) -> Option<Cell> {
        if (B2_BASE..B2_BASE + B2_SIZE as u16).contains(&address) {
            return Some(Cell::B2(usize::from(address - B2_BASE)));
        }
        let layout = self.model.capabilities().blocks;
        let index = (0..layout.len())
            .find(|&i| !self.in_program[i] && layout[i].in_data_window(address))?;
        let offset = address - layout[index].data_base;
        Some(Cell::Block(index, usize::from(offset)))
    }

    fn program_cell(&self, address: u16) -> Option<Cell> {
        let layout = self.model.capabilities().blocks;
        let index = (0..layout.len())
            .find(|&i| self.in_program[i] && layout[i].in_program_window(address))?;
        let offset = address - layout[index].program_base;
        Some(Cell::Block(index, usize::from(offset)))
    }

    fn get(&self, cell: Cell) -> u16 {
        match cell {
            Cell::B2(offset) => self.b2[offset],
            Cell::Block(index, offset) => self.blocks[index][offset],
        }
    }

    fn set(&mut self, cell: Cell, value: u16) {
        match cell {
            Cell::B2(offset) => self.b2[offset] = value,
            Cell::Block(index, offset) => self.blocks[index][offset] = value,
        }
    }

    /// True when `address` in program space is served on chip.
    #[must_use]
    pub fn is_on_chip_program(&self, address: u16) -> bool {
        self.program_cell(address).is_some()
    }

    /// Read an on-chip data word, or `None` when `address` goes off chip.
    #[must_use]
    pub fn data(&self, address: u16) -> Option<u16> {
        match address {
            mmr::DRR => Some(self.drr),
            mmr::DXR => Some(self.dxr),
            mmr::TIM => Some(self.tim),
            mmr::PRD => Some(self.prd),
            mmr::IMR => Some(self.imr),
            mmr::GREG => Some(self.greg),
            _ => self.data_cell(address).map(|cell| self.get(cell)),
        }
    }

    /// Read an on-chip program word, or `None` when `address` goes off
    /// chip.
    #[must_use]
    pub fn program(&self, address: u16) -> Option<u16> {
        self.program_cell(address).map(|cell| self.get(cell))
    }

    /// Store into on-chip data RAM without side effects. Returns false,
    /// storing nothing, when `address` is off chip or a mapped register.
    pub fn poke_data(&mut self, address: u16, value: u16) -> bool {
        match self.data_cell(address) {
            Some(cell) => {
                self.set(cell, value);
                true
            }
            None => false,
        }
    }
}

/// Location of one on-chip RAM word.
#[derive(Debug, Clone, Copy)]
enum Cell {
    B2(usize),
    Block(usize, usize),
}

impl Tms32025 {
    /// Data-space read as seen by an instruction.
    pub(crate) fn read_data<B: Bus>(&mut self, bus: &mut B, address: u16) -> u16 {
        match address {
            mmr::DRR => self.ram.drr,
            mmr::DXR => self.ram.dxr,
            mmr::TIM => self.ram.tim,
            mmr::PRD => self.ram.prd,
            mmr::IMR => self.ram.imr,
            mmr::GREG => self.ram.greg,
            _ => match self.ram.data_cell(address) {
                Some(cell) => self.ram.get(cell),
                None => bus.read_u16(AddressSpace::Data, u32::from(address) << 1),
            },
        }
    }

    /// Data-space write. A DXR write in transmit mode requests XINT, or
    /// waits for a frame sync when FSM is set.
    pub(crate) fn write_data<B: Bus>(&mut self, bus: &mut B, address: u16, value: u16) {
        match address {
            mmr::DRR => self.ram.drr = value,
            mmr::DXR => {
                self.ram.dxr = value;
                if self.regs.status.txm() {
                    if self.regs.status.fsm() {
                        self.waiting_for_frame = true;
                    } else {
                        self.regs.ifr |= ifr::XINT;
                    }
                }
            }
            mmr::TIM => self.ram.tim = value,
            mmr::PRD => self.ram.prd = value,
            mmr::IMR => self.ram.imr = value,
            mmr::GREG => self.ram.greg = value,
            _ => match self.ram.data_cell(address) {
                Some(cell) => self.ram.set(cell, value),
                None => bus.write_u16(AddressSpace::Data, u32::from(address) << 1, value),
            },
        }
    }

    pub(crate) fn read_program<B: Bus>(&mut self, bus: &mut B, address: u16) -> u16 {
        match self.ram.program_cell(address) {
            Some(cell) => self.ram.get(cell),
            None => bus.read_u16(AddressSpace::Program, u32::from(address) << 1),
        }
    }

    pub(crate) fn write_program<B: Bus>(&mut self, bus: &mut B, address: u16, value: u16) {
        match self.ram.program_cell(address) {
            Some(cell) => self.ram.set(cell, value),
            None => bus.write_u16(AddressSpace::Program, u32::from(address) << 1, value),
        }
    }
}
