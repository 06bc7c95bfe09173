//! Opcode decode for the ROMP.
//!
//! Every instruction is identified by its first byte. Bits 15-12 select the
//! format:
//!
//! | Nibble | Format | Length |
//! |---|---|---|
//! | 0 | JI (jump on condition bit) | 2 |
//! | 1-7 | D-short (storage with 4-bit displacement) | 2 |
//! | 8 | BI / BA (branch immediate / absolute) | 4 |
//! | 9, A, B, E, F | R (register-register) | 2 |
//! | C, D | D (16-bit immediate or displacement) | 4 |
//!
//! The table maps the first byte to a handler and its base cost. The base
//! cost covers the step itself plus any cost the handler always incurs;
//! taken branches, exception entry and multi-register transfers debit the
//! rest from the handler.

use emu_core::{OpcodeEntry, OpcodeTable};

/// Handler identifiers, one per mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    // JI and D-short
    Jb,
    Stcs,
    Sths,
    Sts,
    Lcs,
    Lhas,
    Cas,
    Ls,
    // BI and BA
    Bnb,
    Bnbx,
    Bala,
    Balax,
    Bali,
    Balix,
    Bb,
    Bbx,
    // D
    Svc,
    Ai,
    Cal16,
    Oiu,
    Oil,
    Nilz,
    Nilo,
    Xil,
    Cal,
    Lm,
    Lha,
    Ior,
    Ti,
    L,
    Lc,
    Tsh,
    Lps,
    Aei,
    Sfi,
    Cli,
    Ci,
    Niuz,
    Niuo,
    Xiu,
    Cau,
    Stm,
    Lh,
    Iow,
    Sth,
    St,
    Stc,
    // R
    Ais,
    Inc,
    Sis,
    Dec,
    Cis,
    Clrsb,
    Mfs,
    Setsb,
    Clrbu,
    Clrbl,
    Setbu,
    Setbl,
    Mftbiu,
    Mftbil,
    Mttbiu,
    Mttbil,
    Sari,
    Sari16,
    Lis,
    Sri,
    Sri16,
    Sli,
    Sli16,
    Srpi,
    Srpi16,
    Slpi,
    Slpi16,
    Sar,
    Exts,
    Sf,
    Cl,
    C,
    Mts,
    Sr,
    Srp,
    Sl,
    Slp,
    Mftb,
    Tgte,
    Tlt,
    Mttb,
    Abs,
    A,
    S,
    O,
    Twoc,
    N,
    X,
    Bnbr,
    Bnbrx,
    Lhs,
    Balr,
    Balrx,
    Bbr,
    Bbrx,
    Ae,
    Se,
    Ca16,
    Onec,
    Clz,
    Mc03,
    Mc13,
    Mc23,
    Mc33,
    Mc30,
    Mc31,
    Mc32,
    /// Undefined, multiply step, divide step and wait.
    Illegal,
}

impl Op {
    /// True for instructions that may not sit in a branch delay slot.
    #[must_use]
    pub const fn is_branch_class(self) -> bool {
        matches!(
            self,
            Op::Jb
                | Op::Bnb
                | Op::Bnbx
                | Op::Bala
                | Op::Balax
                | Op::Bali
                | Op::Balix
                | Op::Bb
                | Op::Bbx
                | Op::Svc
                | Op::Ti
                | Op::Lps
                | Op::Tgte
                | Op::Tlt
                | Op::Bnbr
                | Op::Bnbrx
                | Op::Balr
                | Op::Balrx
                | Op::Bbr
                | Op::Bbrx
        )
    }
}

const fn entry(op: Op, cycles: u8) -> OpcodeEntry<Op> {
    OpcodeEntry::new(op, cycles)
}

const fn build() -> [OpcodeEntry<Op>; 256] {
    let mut t = [entry(Op::Illegal, 1); 256];

    // Short formats fill a whole nibble each.
    let short = [
        entry(Op::Jb, 1),
        entry(Op::Stcs, 5),
        entry(Op::Sths, 5),
        entry(Op::Sts, 5),
        entry(Op::Lcs, 5),
        entry(Op::Lhas, 5),
        entry(Op::Cas, 1),
        entry(Op::Ls, 5),
    ];
    let mut i = 0;
    while i < 0x80 {
        t[i] = short[i >> 4];
        i += 1;
    }

    t[0x88] = entry(Op::Bnb, 1);
    t[0x89] = entry(Op::Bnbx, 1);
    t[0x8A] = entry(Op::Bala, 1);
    t[0x8B] = entry(Op::Balax, 1);
    t[0x8C] = entry(Op::Bali, 1);
    t[0x8D] = entry(Op::Balix, 1);
    t[0x8E] = entry(Op::Bb, 1);
    t[0x8F] = entry(Op::Bbx, 1);

    t[0x90] = entry(Op::Ais, 1);
    t[0x91] = entry(Op::Inc, 1);
    t[0x92] = entry(Op::Sis, 1);
    t[0x93] = entry(Op::Dec, 1);
    t[0x94] = entry(Op::Cis, 1);
    t[0x95] = entry(Op::Clrsb, 4);
    t[0x96] = entry(Op::Mfs, 2);
    t[0x97] = entry(Op::Setsb, 4);
    t[0x98] = entry(Op::Clrbu, 1);
    t[0x99] = entry(Op::Clrbl, 1);
    t[0x9A] = entry(Op::Setbu, 1);
    t[0x9B] = entry(Op::Setbl, 1);
    t[0x9C] = entry(Op::Mftbiu, 1);
    t[0x9D] = entry(Op::Mftbil, 1);
    t[0x9E] = entry(Op::Mttbiu, 1);
    t[0x9F] = entry(Op::Mttbil, 1);

    t[0xA0] = entry(Op::Sari, 1);
    t[0xA1] = entry(Op::Sari16, 1);
    t[0xA4] = entry(Op::Lis, 1);
    t[0xA8] = entry(Op::Sri, 1);
    t[0xA9] = entry(Op::Sri16, 1);
    t[0xAA] = entry(Op::Sli, 1);
    t[0xAB] = entry(Op::Sli16, 1);
    t[0xAC] = entry(Op::Srpi, 1);
    t[0xAD] = entry(Op::Srpi16, 1);
    t[0xAE] = entry(Op::Slpi, 1);
    t[0xAF] = entry(Op::Slpi16, 1);

    t[0xB0] = entry(Op::Sar, 1);
    t[0xB1] = entry(Op::Exts, 1);
    t[0xB2] = entry(Op::Sf, 1);
    t[0xB3] = entry(Op::Cl, 1);
    t[0xB4] = entry(Op::C, 1);
    t[0xB5] = entry(Op::Mts, 3);
    t[0xB8] = entry(Op::Sr, 1);
    t[0xB9] = entry(Op::Srp, 1);
    t[0xBA] = entry(Op::Sl, 1);
    t[0xBB] = entry(Op::Slp, 1);
    t[0xBC] = entry(Op::Mftb, 1);
    t[0xBD] = entry(Op::Tgte, 2);
    t[0xBE] = entry(Op::Tlt, 2);
    t[0xBF] = entry(Op::Mttb, 1);

    t[0xC0] = entry(Op::Svc, 1);
    t[0xC1] = entry(Op::Ai, 1);
    t[0xC2] = entry(Op::Cal16, 1);
    t[0xC3] = entry(Op::Oiu, 1);
    t[0xC4] = entry(Op::Oil, 1);
    t[0xC5] = entry(Op::Nilz, 1);
    t[0xC6] = entry(Op::Nilo, 1);
    t[0xC7] = entry(Op::Xil, 1);
    t[0xC8] = entry(Op::Cal, 1);
    t[0xC9] = entry(Op::Lm, 1);
    t[0xCA] = entry(Op::Lha, 5);
    t[0xCB] = entry(Op::Ior, 1);
    t[0xCC] = entry(Op::Ti, 1);
    t[0xCD] = entry(Op::L, 5);
    t[0xCE] = entry(Op::Lc, 5);
    t[0xCF] = entry(Op::Tsh, 5);

    t[0xD0] = entry(Op::Lps, 1);
    t[0xD1] = entry(Op::Aei, 1);
    t[0xD2] = entry(Op::Sfi, 1);
    t[0xD3] = entry(Op::Cli, 1);
    t[0xD4] = entry(Op::Ci, 1);
    t[0xD5] = entry(Op::Niuz, 1);
    t[0xD6] = entry(Op::Niuo, 1);
    t[0xD7] = entry(Op::Xiu, 1);
    t[0xD8] = entry(Op::Cau, 1);
    t[0xD9] = entry(Op::Stm, 1);
    t[0xDA] = entry(Op::Lh, 5);
    t[0xDB] = entry(Op::Iow, 2);
    t[0xDC] = entry(Op::Sth, 5);
    t[0xDD] = entry(Op::St, 5);
    t[0xDE] = entry(Op::Stc, 5);

    t[0xE0] = entry(Op::Abs, 2);
    t[0xE1] = entry(Op::A, 1);
    t[0xE2] = entry(Op::S, 1);
    t[0xE3] = entry(Op::O, 1);
    t[0xE4] = entry(Op::Twoc, 1);
    t[0xE5] = entry(Op::N, 1);
    t[0xE7] = entry(Op::X, 1);
    t[0xE8] = entry(Op::Bnbr, 1);
    t[0xE9] = entry(Op::Bnbrx, 1);
    t[0xEB] = entry(Op::Lhs, 5);
    t[0xEC] = entry(Op::Balr, 1);
    t[0xED] = entry(Op::Balrx, 1);
    t[0xEE] = entry(Op::Bbr, 1);
    t[0xEF] = entry(Op::Bbrx, 1);

    t[0xF1] = entry(Op::Ae, 1);
    t[0xF2] = entry(Op::Se, 1);
    t[0xF3] = entry(Op::Ca16, 1);
    t[0xF4] = entry(Op::Onec, 1);
    t[0xF5] = entry(Op::Clz, 1);
    t[0xF9] = entry(Op::Mc03, 1);
    t[0xFA] = entry(Op::Mc13, 1);
    t[0xFB] = entry(Op::Mc23, 1);
    t[0xFC] = entry(Op::Mc33, 1);
    t[0xFD] = entry(Op::Mc30, 1);
    t[0xFE] = entry(Op::Mc31, 1);
    t[0xFF] = entry(Op::Mc32, 1);

    t
}

/// Dispatch table keyed by the first instruction byte.
pub(crate) static TABLE: OpcodeTable<Op, 256> = OpcodeTable::new(build());

/// Look up the handler for an instruction halfword.
#[must_use]
pub(crate) fn decode(op: u16) -> OpcodeEntry<Op> {
    TABLE.get(usize::from(op >> 8))
}

/// BI, BA and D formats carry a second halfword.
#[must_use]
pub(crate) const fn has_extension(op: u16) -> bool {
    matches!(op >> 12, 0x8 | 0xC | 0xD)
}

/// Register field R2 (bits 8-11).
#[must_use]
pub(crate) const fn r2(op: u16) -> usize {
    ((op >> 4) & 15) as usize
}

/// Register field R3 (bits 12-15).
#[must_use]
pub(crate) const fn r3(op: u16) -> usize {
    (op & 15) as usize
}

/// JI displacement: signed halfword count in the low byte.
#[must_use]
pub(crate) const fn ji(op: u16) -> u32 {
    ((op as u8 as i8 as i32) << 1) as u32
}

/// BI displacement: signed 20-bit halfword count from R3 and the
/// extension.
#[must_use]
pub(crate) const fn bi(op: u16, b: u16) -> u32 {
    ((((op as u32 & 15) << 28) | ((b as u32) << 12)) as i32 >> 11) as u32
}

/// BA target: 24-bit absolute halfword address.
#[must_use]
pub(crate) const fn ba(op: u16, b: u16) -> u32 {
    (((op as u32 & 0xFF) << 16) | b as u32) & !1
}

#[cfg(test)]
mod tests {
    use super::{Op, TABLE, ba, bi, decode, has_extension, ji};

    #[test]
    fn short_formats_cover_their_whole_nibble() {
        for op in [0x0000u16, 0x0F00, 0x1234, 0x5FFF, 0x7ABC] {
            assert_ne!(decode(op).handler, Op::Illegal, "{op:04x}");
        }
        assert_eq!(decode(0x4321).handler, Op::Lcs);
        assert_eq!(decode(0x4321).cycles, 5);
    }

    #[test]
    fn unimplemented_slots_are_explicit_illegal_entries() {
        for byte in [0x80u16, 0x87, 0xA2, 0xA5, 0xB6, 0xB7, 0xDF, 0xE6, 0xEA, 0xF0, 0xF8] {
            assert_eq!(decode(byte << 8).handler, Op::Illegal, "{byte:02x}");
        }
        let defined = TABLE.iter().filter(|e| e.handler != Op::Illegal).count();
        assert_eq!(defined, 0x80 + 8 + 16 + 11 + 14 + 16 + 15 + 14 + 12);
    }

    #[test]
    fn extension_word_follows_the_format_nibble() {
        assert!(has_extension(0x8800));
        assert!(has_extension(0xC100));
        assert!(has_extension(0xDE00));
        assert!(!has_extension(0x9000));
        assert!(!has_extension(0xE100));
    }

    #[test]
    fn branch_displacements_are_sign_extended_halfword_counts() {
        assert_eq!(ji(0x0003), 6);
        assert_eq!(ji(0x00FF), (-2i32) as u32);
        assert_eq!(bi(0x8800, 0x0010), 0x20);
        assert_eq!(bi(0x880F, 0xFFFF), (-2i32) as u32);
        assert_eq!(bi(0x8808, 0x0000), (-0x10_0000i32) as u32);
        assert_eq!(ba(0x8A12, 0x3457), 0x0012_3456);
    }

    #[test]
    fn delay_slot_restriction_covers_every_branch_and_trap() {
        for byte in [0x00u16, 0x88, 0x8F, 0xC0, 0xCC, 0xD0, 0xBD, 0xBE, 0xE8, 0xEF] {
            assert!(decode(byte << 8).handler.is_branch_class(), "{byte:02x}");
        }
        assert!(!decode(0xE100).handler.is_branch_class());
    }
}
