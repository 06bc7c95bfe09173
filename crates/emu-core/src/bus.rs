//! Address-space bus interface.

use std::collections::HashMap;

/// One of the address spaces a core can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressSpace {
    /// Instruction fetches and program-memory operands.
    Program,
    /// Data memory.
    Data,
    /// I/O ports.
    Io,
}

impl AddressSpace {
    const fn index(self) -> usize {
        match self {
            Self::Program => 0,
            Self::Data => 1,
            Self::Io => 2,
        }
    }
}

/// Memory and I/O bus interface.
///
/// Addresses are byte addresses and multi-byte values are big-endian. A core
/// with word-addressed memory shifts its word address left by one before
/// calling in, so every access lands on an even byte address.
pub trait Bus {
    /// Read a byte.
    fn read_u8(&mut self, space: AddressSpace, address: u32) -> u8;

    /// Read a 16-bit halfword.
    fn read_u16(&mut self, space: AddressSpace, address: u32) -> u16;

    /// Read a 32-bit word as two halfword accesses.
    fn read_u32(&mut self, space: AddressSpace, address: u32) -> u32 {
        let hi = self.read_u16(space, address);
        let lo = self.read_u16(space, address.wrapping_add(2));
        (u32::from(hi) << 16) | u32::from(lo)
    }

    /// Write a byte.
    fn write_u8(&mut self, space: AddressSpace, address: u32, value: u8);

    /// Write a 16-bit halfword.
    fn write_u16(&mut self, space: AddressSpace, address: u32, value: u16);

    /// Write a 32-bit word as two halfword accesses.
    fn write_u32(&mut self, space: AddressSpace, address: u32, value: u32) {
        self.write_u16(space, address, (value >> 16) as u16);
        self.write_u16(space, address.wrapping_add(2), value as u16);
    }
}

/// Sparse flat memory covering all three address spaces.
///
/// Unwritten bytes read as zero. Every read through the [`Bus`] trait is
/// counted per space, which lets a test prove an instruction was fetched
/// exactly once; the `peek_*` helpers do not count.
#[derive(Debug, Clone, Default)]
pub struct MemoryBus {
    spaces: [HashMap<u32, u8>; 3],
    reads: [usize; 3],
    writes: [usize; 3],
}

impl MemoryBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy a byte image into a space starting at `address`.
    pub fn load(&mut self, space: AddressSpace, address: u32, bytes: &[u8]) {
        let map = &mut self.spaces[space.index()];
        for (offset, &byte) in bytes.iter().enumerate() {
            map.insert(address.wrapping_add(offset as u32), byte);
        }
    }

    /// Copy big-endian halfwords into a space starting at byte `address`.
    pub fn load_words(&mut self, space: AddressSpace, address: u32, words: &[u16]) {
        for (i, &word) in words.iter().enumerate() {
            let at = address.wrapping_add(2 * i as u32);
            self.load(space, at, &word.to_be_bytes());
        }
    }

    /// Read a byte without counting the access.
    #[must_use]
    pub fn peek_u8(&self, space: AddressSpace, address: u32) -> u8 {
        self.spaces[space.index()]
            .get(&address)
            .copied()
            .unwrap_or(0)
    }

    /// Read a halfword without counting the access.
    #[must_use]
    pub fn peek_u16(&self, space: AddressSpace, address: u32) -> u16 {
        u16::from_be_bytes([
            self.peek_u8(space, address),
            self.peek_u8(space, address.wrapping_add(1)),
        ])
    }

    /// Read a word without counting the access.
    #[must_use]
    pub fn peek_u32(&self, space: AddressSpace, address: u32) -> u32 {
        (u32::from(self.peek_u16(space, address)) << 16)
            | u32::from(self.peek_u16(space, address.wrapping_add(2)))
    }

    /// Number of reads issued against `space` since creation.
    #[must_use]
    pub fn read_count(&self, space: AddressSpace) -> usize {
        self.reads[space.index()]
    }

    /// Number of writes issued against `space` since creation.
    #[must_use]
    pub fn write_count(&self, space: AddressSpace) -> usize {
        self.writes[space.index()]
    }

    fn poke_u8(&mut self, space: AddressSpace, address: u32, value: u8) {
        self.spaces[space.index()].insert(address, value);
    }
}

impl Bus for MemoryBus {
    fn read_u8(&mut self, space: AddressSpace, address: u32) -> u8 {
        self.reads[space.index()] += 1;
        self.peek_u8(space, address)
    }

    fn read_u16(&mut self, space: AddressSpace, address: u32) -> u16 {
        self.reads[space.index()] += 1;
        self.peek_u16(space, address)
    }

    fn write_u8(&mut self, space: AddressSpace, address: u32, value: u8) {
        self.writes[space.index()] += 1;
        self.poke_u8(space, address, value);
    }

    fn write_u16(&mut self, space: AddressSpace, address: u32, value: u16) {
        self.writes[space.index()] += 1;
        let [hi, lo] = value.to_be_bytes();
        self.poke_u8(space, address, hi);
        self.poke_u8(space, address.wrapping_add(1), lo);
    }
}
