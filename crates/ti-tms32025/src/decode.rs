//! Opcode decode for the TMS3202x.
//!
//! Three tables, each entry a handler plus a base cost in machine cycles:
//!
//! - the main table, keyed by the high byte;
//! - the control table, used when the high byte is `0xCE` and keyed by
//!   the low byte;
//! - the long-immediate table, used when `op & 0xF0F8 == 0xD000` and keyed
//!   by bits 2-0. These instructions take a second program word.
//!
//! Main-table slots `0xD0`-`0xDF` that do not match the long-immediate
//! pattern are undefined.

use emu_core::{OpcodeEntry, OpcodeTable};

/// Handler identifiers, one per mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    // Main table
    Add,
    Sub,
    Lac,
    Lar,
    Mpy,
    Sqra,
    Mpya,
    Mpys,
    Lt,
    Lta,
    Ltp,
    Ltd,
    Zalh,
    Zals,
    Lact,
    Addc,
    Subh,
    Subs,
    Subt,
    Subc,
    Addh,
    Adds,
    Addt,
    Rpt,
    Xor,
    Or,
    And,
    Subb,
    Lst,
    Lst1,
    Ldp,
    Lph,
    Pshd,
    Mar,
    Dmov,
    Bitt,
    Tblr,
    Tblw,
    Sqrs,
    Lts,
    Macd,
    Mac,
    Bc,
    Bnc,
    Sacl,
    Sach,
    Sar,
    Sst,
    Sst1,
    Popd,
    Zalr,
    Spl,
    Sph,
    Adrk,
    Sbrk,
    In,
    Bit,
    Mpyk,
    Lark,
    Ldpk,
    Lack,
    Rptk,
    Addk,
    Subk,
    Mpyu,
    Out,
    Bv,
    Bgz,
    Blez,
    Blz,
    Bgez,
    Bnz,
    Bz,
    Bnv,
    Bbz,
    Bbnz,
    Bioz,
    Banz,
    Blkp,
    Blkd,
    Call,
    B,

    // Control table (0xCExx)
    Eint,
    Dint,
    Rovm,
    Sovm,
    Cnfd,
    Cnfp,
    Rsxm,
    Ssxm,
    Spm,
    Rxf,
    Sxf,
    Fort,
    Pac,
    Apac,
    Spac,
    Sfl,
    Sfr,
    Abs,
    Push,
    Pop,
    Trap,
    Idle,
    Rtxm,
    Stxm,
    Neg,
    Cala,
    Bacc,
    Ret,
    Cmpl,
    Rc,
    Sc,
    Rtc,
    Stc,
    Rol,
    Ror,
    Rfsm,
    Sfsm,
    Rhm,
    Shm,
    Conf,
    Cmpr,
    Norm,

    // Long-immediate table (0xDr0x)
    Lrlk,
    Lalk,
    Adlk,
    Sblk,
    Andk,
    Ork,
    Xork,

    Illegal,
}

const fn entry(op: Op, cycles: u8) -> OpcodeEntry<Op> {
    OpcodeEntry::new(op, cycles)
}

const ILLEGAL: OpcodeEntry<Op> = entry(Op::Illegal, 0);

const fn fill(t: &mut [OpcodeEntry<Op>; 256], from: usize, to: usize, e: OpcodeEntry<Op>) {
    let mut i = from;
    while i <= to {
        t[i] = e;
        i += 1;
    }
}

const fn build_main() -> [OpcodeEntry<Op>; 256] {
    let mut t = [ILLEGAL; 256];

    fill(&mut t, 0x00, 0x0F, entry(Op::Add, 1));
    fill(&mut t, 0x10, 0x1F, entry(Op::Sub, 1));
    fill(&mut t, 0x20, 0x2F, entry(Op::Lac, 1));
    fill(&mut t, 0x30, 0x37, entry(Op::Lar, 1));

    let row3 = [
        Op::Mpy,
        Op::Sqra,
        Op::Mpya,
        Op::Mpys,
        Op::Lt,
        Op::Lta,
        Op::Ltp,
        Op::Ltd,
    ];
    let row4 = [
        Op::Zalh,
        Op::Zals,
        Op::Lact,
        Op::Addc,
        Op::Subh,
        Op::Subs,
        Op::Subt,
        Op::Subc,
        Op::Addh,
        Op::Adds,
        Op::Addt,
        Op::Rpt,
        Op::Xor,
        Op::Or,
        Op::And,
        Op::Subb,
    ];
    let row5 = [
        Op::Lst,
        Op::Lst1,
        Op::Ldp,
        Op::Lph,
        Op::Pshd,
        Op::Mar,
        Op::Dmov,
        Op::Bitt,
    ];
    let row7 = [
        Op::Sst,
        Op::Sst1,
        Op::Popd,
        Op::Zalr,
        Op::Spl,
        Op::Sph,
        Op::Adrk,
        Op::Sbrk,
    ];
    let mut i = 0;
    while i < 8 {
        t[0x38 + i] = entry(row3[i], 1);
        t[0x50 + i] = entry(row5[i], 1);
        t[0x78 + i] = entry(row7[i], 1);
        i += 1;
    }
    i = 0;
    while i < 16 {
        t[0x40 + i] = entry(row4[i], 1);
        i += 1;
    }

    t[0x58] = entry(Op::Tblr, 3);
    t[0x59] = entry(Op::Tblw, 2);
    t[0x5A] = entry(Op::Sqrs, 1);
    t[0x5B] = entry(Op::Lts, 1);
    t[0x5C] = entry(Op::Macd, 2);
    t[0x5D] = entry(Op::Mac, 2);
    t[0x5E] = entry(Op::Bc, 2);
    t[0x5F] = entry(Op::Bnc, 2);

    fill(&mut t, 0x60, 0x67, entry(Op::Sacl, 1));
    fill(&mut t, 0x68, 0x6F, entry(Op::Sach, 1));
    fill(&mut t, 0x70, 0x77, entry(Op::Sar, 1));
    fill(&mut t, 0x80, 0x8F, entry(Op::In, 2));
    fill(&mut t, 0x90, 0x9F, entry(Op::Bit, 1));
    fill(&mut t, 0xA0, 0xBF, entry(Op::Mpyk, 1));
    fill(&mut t, 0xC0, 0xC7, entry(Op::Lark, 1));
    fill(&mut t, 0xC8, 0xC9, entry(Op::Ldpk, 1));
    t[0xCA] = entry(Op::Lack, 1);
    t[0xCB] = entry(Op::Rptk, 1);
    t[0xCC] = entry(Op::Addk, 1);
    t[0xCD] = entry(Op::Subk, 1);
    t[0xCF] = entry(Op::Mpyu, 1);
    fill(&mut t, 0xE0, 0xEF, entry(Op::Out, 2));

    let branches = [
        Op::Bv,
        Op::Bgz,
        Op::Blez,
        Op::Blz,
        Op::Bgez,
        Op::Bnz,
        Op::Bz,
        Op::Bnv,
        Op::Bbz,
        Op::Bbnz,
        Op::Bioz,
        Op::Banz,
        Op::Blkp,
        Op::Blkd,
        Op::Call,
        Op::B,
    ];
    i = 0;
    while i < 16 {
        t[0xF0 + i] = entry(branches[i], 2);
        i += 1;
    }

    t
}

const fn build_control() -> [OpcodeEntry<Op>; 256] {
    let mut t = [ILLEGAL; 256];

    let row0 = [
        Op::Eint,
        Op::Dint,
        Op::Rovm,
        Op::Sovm,
        Op::Cnfd,
        Op::Cnfp,
        Op::Rsxm,
        Op::Ssxm,
        Op::Spm,
        Op::Spm,
        Op::Spm,
        Op::Spm,
        Op::Rxf,
        Op::Sxf,
        Op::Fort,
        Op::Fort,
    ];
    let row3 = [
        Op::Rc,
        Op::Sc,
        Op::Rtc,
        Op::Stc,
        Op::Rol,
        Op::Ror,
        Op::Rfsm,
        Op::Sfsm,
        Op::Rhm,
        Op::Shm,
    ];
    let mut i = 0;
    while i < 16 {
        t[i] = entry(row0[i], 1);
        i += 1;
    }
    i = 0;
    while i < 10 {
        t[0x30 + i] = entry(row3[i], 1);
        i += 1;
    }

    t[0x14] = entry(Op::Pac, 1);
    t[0x15] = entry(Op::Apac, 1);
    t[0x16] = entry(Op::Spac, 1);
    t[0x18] = entry(Op::Sfl, 1);
    t[0x19] = entry(Op::Sfr, 1);
    t[0x1B] = entry(Op::Abs, 1);
    t[0x1C] = entry(Op::Push, 1);
    t[0x1D] = entry(Op::Pop, 1);
    t[0x1E] = entry(Op::Trap, 2);
    t[0x1F] = entry(Op::Idle, 3);

    t[0x20] = entry(Op::Rtxm, 1);
    t[0x21] = entry(Op::Stxm, 1);
    t[0x23] = entry(Op::Neg, 1);
    t[0x24] = entry(Op::Cala, 2);
    t[0x25] = entry(Op::Bacc, 2);
    t[0x26] = entry(Op::Ret, 2);
    t[0x27] = entry(Op::Cmpl, 1);

    fill(&mut t, 0x3C, 0x3F, entry(Op::Conf, 1));
    fill(&mut t, 0x50, 0x53, entry(Op::Cmpr, 1));

    // NORM carries an indirect modification in bits 6-4.
    i = 0x82;
    while i <= 0xF2 {
        t[i] = entry(Op::Norm, 1);
        i += 0x10;
    }

    t
}

const fn build_long_immediate() -> [OpcodeEntry<Op>; 8] {
    [
        entry(Op::Lrlk, 2),
        entry(Op::Lalk, 2),
        entry(Op::Adlk, 2),
        entry(Op::Sblk, 2),
        entry(Op::Andk, 2),
        entry(Op::Ork, 2),
        entry(Op::Xork, 2),
        ILLEGAL,
    ]
}

pub(crate) static MAIN: OpcodeTable<Op, 256> = OpcodeTable::new(build_main());
pub(crate) static CONTROL: OpcodeTable<Op, 256> = OpcodeTable::new(build_control());
pub(crate) static LONG_IMMEDIATE: OpcodeTable<Op, 8> = OpcodeTable::new(build_long_immediate());

/// Look up the handler for an instruction word.
#[must_use]
pub(crate) fn decode(op: u16) -> OpcodeEntry<Op> {
    let [high, low] = op.to_be_bytes();
    if high == 0xCE {
        CONTROL.get(usize::from(low))
    } else if op & 0xF0F8 == 0xD000 {
        LONG_IMMEDIATE.get(usize::from(low & 7))
    } else {
        MAIN.get(usize::from(high))
    }
}
