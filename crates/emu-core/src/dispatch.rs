//! Declarative opcode dispatch tables.
//!
//! A table maps an opcode index to a handler identifier and a base cycle
//! cost. Tables are plain arrays built in `const` context by the owning
//! core, so lookup is a single index and the handler set is fixed at
//! compile time.

/// One slot of a dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeEntry<H> {
    /// Handler identifier.
    pub handler: H,
    /// Base cost, debited before the handler runs.
    pub cycles: u8,
}

impl<H> OpcodeEntry<H> {
    /// Pair a handler with its base cost.
    #[must_use]
    pub const fn new(handler: H, cycles: u8) -> Self {
        Self { handler, cycles }
    }
}

/// A fixed-size dispatch table.
#[derive(Debug, Clone)]
pub struct OpcodeTable<H, const N: usize> {
    entries: [OpcodeEntry<H>; N],
}

impl<H: Copy, const N: usize> OpcodeTable<H, N> {
    /// Wrap a fully populated entry array.
    #[must_use]
    pub const fn new(entries: [OpcodeEntry<H>; N]) -> Self {
        Self { entries }
    }

    /// Look up the entry for `index`. Indices wrap at the table size.
    #[must_use]
    pub fn get(&self, index: usize) -> OpcodeEntry<H> {
        self.entries[index % N]
    }

    /// Iterate all entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &OpcodeEntry<H>> {
        self.entries.iter()
    }
}
