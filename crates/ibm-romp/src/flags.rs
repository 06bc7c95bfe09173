//! ROMP condition status (CS) register.
//!
//! The low byte of CS holds the condition bits:
//! - T (bit 0): Test bit, the target of the `mttb*` family
//! - O (bit 1): Overflow
//! - C (bit 3): Carry
//! - G (bit 4): Greater than zero
//! - E (bit 5): Equal to zero
//! - L (bit 6): Less than zero
//! - P (bit 7): Permanent zero
//!
//! Conditional branches name a CS bit by its IBM bit number, so bit `n`
//! counted from the left of the halfword is `15 - n` from the right.

use std::fmt;

/// Test bit.
pub const T: u32 = 0x01;
/// Overflow.
pub const O: u32 = 0x02;
/// Carry.
pub const C: u32 = 0x08;
/// Greater than zero.
pub const G: u32 = 0x10;
/// Equal to zero.
pub const E: u32 = 0x20;
/// Less than zero.
pub const L: u32 = 0x40;
/// Permanent zero.
pub const P: u32 = 0x80;

const SIGN: u32 = 0x8000_0000;

/// Typed view of the condition status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConditionStatus(u32);

impl ConditionStatus {
    /// Wrap a raw CS value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The packed register value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Bit `n` counted from the least significant end.
    #[must_use]
    pub const fn bit(self, n: u32) -> bool {
        n < 32 && (self.0 >> n) & 1 != 0
    }

    #[must_use]
    pub const fn less(self) -> bool {
        self.0 & L != 0
    }

    #[must_use]
    pub const fn equal(self) -> bool {
        self.0 & E != 0
    }

    #[must_use]
    pub const fn greater(self) -> bool {
        self.0 & G != 0
    }

    #[must_use]
    pub const fn carry(self) -> bool {
        self.0 & C != 0
    }

    #[must_use]
    pub const fn overflow(self) -> bool {
        self.0 & O != 0
    }

    #[must_use]
    pub const fn test(self) -> bool {
        self.0 & T != 0
    }

    /// Set or clear the test bit.
    pub fn set_test(&mut self, value: bool) {
        self.set_if(T, value);
    }

    /// Set L, E or G from a logical result.
    pub fn set_logical(&mut self, result: u32) {
        self.0 &= !(L | E | G);
        self.0 |= Self::compare_bits(result);
    }

    /// Set L/E/G, carry and overflow for `op1 + op2`.
    pub fn set_add(&mut self, op1: u32, op2: u32) {
        let result = op1.wrapping_add(op2);
        let (s1, s2, sr) = (op1 & SIGN != 0, op2 & SIGN != 0, result & SIGN != 0);

        self.0 &= !(L | E | G | C | O);
        self.0 |= Self::compare_bits(result);
        self.set_if(C, (s2 && s1) || (!sr && (s2 || s1)));
        self.set_if(O, s2 == s1 && sr != s2);
    }

    /// Set L/E/G, carry and overflow for `op1 - op2`.
    ///
    /// Carry here is the ROMP "borrow-style" carry and is not the mirror
    /// image of the add formula.
    pub fn set_sub(&mut self, op1: u32, op2: u32) {
        let result = op1.wrapping_sub(op2);
        let (s1, s2, sr) = (op1 & SIGN != 0, op2 & SIGN != 0, result & SIGN != 0);

        self.0 &= !(L | E | G | C | O);
        self.0 |= Self::compare_bits(result);
        self.set_if(C, (!s2 && s1) || (sr && (!s2 || s1)));
        self.set_if(O, s2 != s1 && sr != s2);
    }

    fn set_if(&mut self, mask: u32, condition: bool) {
        if condition {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    const fn compare_bits(result: u32) -> u32 {
        if result == 0 {
            E
        } else if result & SIGN != 0 {
            L
        } else {
            G
        }
    }
}

impl From<u32> for ConditionStatus {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<ConditionStatus> for u32 {
    fn from(cs: ConditionStatus) -> Self {
        cs.0
    }
}

/// Renders `LEGCOT`, with `.` for each clear bit.
impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (mask, letter) in [(L, 'L'), (E, 'E'), (G, 'G'), (C, 'C'), (O, 'O'), (T, 'T')] {
            let ch = if self.0 & mask != 0 { letter } else { '.' };
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{C, ConditionStatus, E, G, L, O, P, T};

    fn add(a: u32, b: u32) -> ConditionStatus {
        let mut cs = ConditionStatus::default();
        cs.set_add(a, b);
        cs
    }

    fn sub(a: u32, b: u32) -> ConditionStatus {
        let mut cs = ConditionStatus::default();
        cs.set_sub(a, b);
        cs
    }

    #[test]
    fn add_wrapping_to_zero_sets_equal_and_carry() {
        let cs = add(0xFFFF_FFFF, 1);
        assert!(cs.equal());
        assert!(cs.carry());
        assert!(!cs.overflow());
        assert!(!cs.less() && !cs.greater());
    }

    #[test]
    fn sub_one_from_zero_sets_less_and_carry() {
        let cs = sub(0, 1);
        assert!(cs.less());
        assert!(cs.carry());
        assert!(!cs.overflow());
    }

    #[test]
    fn add_of_two_positives_crossing_sign_overflows() {
        let cs = add(0x7FFF_FFFF, 1);
        assert!(cs.less());
        assert!(cs.overflow());
        assert!(!cs.carry());
    }

    #[test]
    fn logical_result_preserves_carry_overflow_and_test() {
        let mut cs = ConditionStatus::new(C | O | T | G);
        cs.set_logical(0x8000_0000);
        assert_eq!(cs.raw(), C | O | T | L);
        cs.set_logical(0);
        assert_eq!(cs.raw(), C | O | T | E);
    }

    #[test]
    fn bit_numbers_count_from_the_right() {
        let cs = ConditionStatus::new(E | P);
        assert!(cs.bit(5));
        assert!(cs.bit(7));
        assert!(!cs.bit(6));
        assert!(!cs.bit(40));
    }

    #[test]
    fn renders_one_letter_per_condition_bit() {
        assert_eq!(ConditionStatus::new(0).to_string(), "......");
        assert_eq!(ConditionStatus::new(L | C | T).to_string(), "L..C.T");
        assert_eq!(ConditionStatus::new(E | G | O).to_string(), ".EG.O.");
    }
}
