//! Indirect addressing through the auxiliary registers.
//!
//! When bit 7 of an instruction is set, the low byte selects indirect mode:
//!
//! | Bits 6-4 | Syntax | Post-modification of AR(ARP) |
//! |---|---|---|
//! | 000 | `*` | none |
//! | 001 | `*-` | decrement |
//! | 010 | `*+` | increment |
//! | 011 | | reserved, none |
//! | 100 | `*BR0-` | subtract AR0 with reverse carry |
//! | 101 | `*0-` | subtract AR0 |
//! | 110 | `*0+` | add AR0 |
//! | 111 | `*BR0+` | add AR0 with reverse carry |
//!
//! Bit 3 set loads ARP from bits 2-0 after the modification, saving the
//! old pointer in ARB.

use crate::registers::Registers;

/// Add two indices with the carry propagating from the most significant
/// bit towards the least. Stepping by half the transform size walks an
/// array in bit-reversed order.
#[must_use]
pub fn reverse_carry_add(mut a: u16, mut b: u16) -> u16 {
    let mut result = 0u16;
    let mut carry = 0u16;
    for _ in 0..16 {
        let sum = (a >> 15) + (b >> 15) + carry;
        result = (result << 1) | (sum & 1);
        carry = sum >> 1;
        a <<= 1;
        b <<= 1;
    }
    result
}

/// Apply the post-modification encoded in `op` to the current auxiliary
/// register, then switch ARP if requested and `update_arp` allows it.
pub(crate) fn modify_ar(regs: &mut Registers, op: u16, update_arp: bool) {
    let ar0 = regs.ar[0];
    let ar = regs.current_ar_mut();
    *ar = match op & 0x70 {
        0x10 => ar.wrapping_sub(1),
        0x20 => ar.wrapping_add(1),
        0x40 => reverse_carry_add(*ar, ar0.wrapping_neg()),
        0x50 => ar.wrapping_sub(ar0),
        0x60 => ar.wrapping_add(ar0),
        0x70 => reverse_carry_add(*ar, ar0),
        _ => *ar,
    };

    if update_arp && op & 0x08 != 0 {
        regs.status.set_arp(usize::from(op & 7));
    }
}

#[cfg(test)]
mod tests {
    use super::{modify_ar, reverse_carry_add};
    use crate::registers::Registers;

    #[test]
    fn reverse_carry_walks_bit_reversed_order() {
        let mut index = 0u16;
        let mut seen = Vec::new();
        for _ in 0..8 {
            seen.push(index);
            index = reverse_carry_add(index, 4);
        }
        assert_eq!(seen, [0, 4, 2, 6, 1, 5, 3, 7]);
    }

    #[test]
    fn post_modify_and_switch_pointer() {
        let mut regs = Registers::new(0x0180);
        regs.ar = [3, 10, 20, 0, 0, 0, 0, 0];
        regs.status.set_arp(1);

        modify_ar(&mut regs, 0xA0, true); // *+
        assert_eq!(regs.ar[1], 11);

        modify_ar(&mut regs, 0xDA, true); // *0-, ARP=2
        assert_eq!(regs.ar[1], 8);
        assert_eq!(regs.status.arp(), 2);
        assert_eq!(regs.status.arb(), 1);

        modify_ar(&mut regs, 0x9B, false); // *-, ARP change suppressed
        assert_eq!(regs.ar[2], 19);
        assert_eq!(regs.status.arp(), 2);

        modify_ar(&mut regs, 0xB0, true); // reserved
        assert_eq!(regs.ar[2], 19);
    }
}
