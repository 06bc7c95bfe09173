//! Model/capability definitions for the TMS3202x family.
//!
//! The TMS32025 and TMS32026 share an instruction set. They differ in the
//! size and placement of the on-chip RAM blocks, in which configuration
//! instruction moves those blocks between data and program space, and in
//! the meaning of ST1 bit 7 (fixed one on the '25, CNF1 on the '26).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Selected DSP model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Model {
    /// TMS32025: blocks B0/B1/B2, `CNFD`/`CNFP` remap B0.
    #[default]
    Tms32025,
    /// TMS32026: blocks B0/B1/B2/B3, `CONF` selects one of four layouts.
    Tms32026,
}

/// One configurable on-chip RAM block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamBlock {
    /// Block name, for logging.
    pub name: &'static str,
    /// Size in words.
    pub size: u16,
    /// First word of the block's data-space window.
    pub data_base: u16,
    /// First word of the block's program-space window.
    pub program_base: u16,
}

impl RamBlock {
    /// True when `address` falls in the data window.
    #[must_use]
    pub const fn in_data_window(&self, address: u16) -> bool {
        address >= self.data_base && address - self.data_base < self.size
    }

    /// True when `address` falls in the program window.
    #[must_use]
    pub const fn in_program_window(&self, address: u16) -> bool {
        address >= self.program_base && address - self.program_base < self.size
    }
}

/// Capability set for a specific model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// `CNFD`/`CNFP` move B0 between data and program space.
    pub cnf_pair: bool,
    /// `CONF` selects the block layout.
    pub conf: bool,
    /// Configurable blocks, in `CONF` order. B2 is always data and is not
    /// listed.
    pub blocks: &'static [RamBlock],
    /// ST1 bits that read as one whatever is written.
    pub st1_fixed: u16,
}

const TMS32025_BLOCKS: &[RamBlock] = &[
    RamBlock {
        name: "B0",
        size: 0x100,
        data_base: 0x0200,
        program_base: 0xFF00,
    },
    // B1 cannot be moved on the '25. Its program window is never mapped.
    RamBlock {
        name: "B1",
        size: 0x100,
        data_base: 0x0300,
        program_base: 0x0000,
    },
];

const TMS32026_BLOCKS: &[RamBlock] = &[
    RamBlock {
        name: "B0",
        size: 0x200,
        data_base: 0x0200,
        program_base: 0xFA00,
    },
    RamBlock {
        name: "B1",
        size: 0x200,
        data_base: 0x0400,
        program_base: 0xFC00,
    },
    RamBlock {
        name: "B3",
        size: 0x200,
        data_base: 0x0600,
        program_base: 0xFE00,
    },
];

impl Model {
    /// Static capability set for this model.
    #[must_use]
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::Tms32025 => Capabilities {
                cnf_pair: true,
                conf: false,
                blocks: TMS32025_BLOCKS,
                st1_fixed: 0x0180,
            },
            Self::Tms32026 => Capabilities {
                cnf_pair: false,
                conf: true,
                blocks: TMS32026_BLOCKS,
                st1_fixed: 0x0100,
            },
        }
    }

    /// Lower-case part name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tms32025 => "tms32025",
            Self::Tms32026 => "tms32026",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing a model name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The name matches no supported part.
    #[error("unknown DSP model `{0}` (expected tms32025 or tms32026)")]
    Unknown(String),
}

impl FromStr for Model {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tms32025" | "32025" | "c25" => Ok(Self::Tms32025),
            "tms32026" | "32026" | "c26" => Ok(Self::Tms32026),
            _ => Err(ModelError::Unknown(s.to_string())),
        }
    }
}
