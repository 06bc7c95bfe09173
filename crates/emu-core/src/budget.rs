//! Signed cycle accountant.

/// Cycles left for the current `run` call.
///
/// The count is signed: an instruction may overdraw the budget, and the
/// core stops at the next step boundary once the remainder is zero or
/// negative. Cancelling is done by truncating the budget to zero, which is
/// the only way a host can cut a run short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleBudget(i64);

impl CycleBudget {
    /// Create a budget of `cycles`.
    #[must_use]
    pub const fn new(cycles: i64) -> Self {
        Self(cycles)
    }

    /// Cycles still available. Negative after an overdraw.
    #[must_use]
    pub const fn remaining(self) -> i64 {
        self.0
    }

    /// True once the budget is used up.
    #[must_use]
    pub const fn is_exhausted(self) -> bool {
        self.0 <= 0
    }

    /// Debit `cycles`.
    pub fn consume(&mut self, cycles: i64) {
        self.0 = self.0.saturating_sub(cycles);
    }

    /// Give back `cycles` that were debited early.
    pub fn refund(&mut self, cycles: i64) {
        self.0 = self.0.saturating_add(cycles);
    }

    /// Truncate to zero so the core stops at the next step boundary.
    pub fn cancel(&mut self) {
        self.0 = 0;
    }
}
