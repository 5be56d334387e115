//! Ledger consensus constants

/// Maximum height difference behind the best tip at which a branch remains
/// extendable and retained.
pub const CUT_OFF_AGE: u64 = 10;

/// Maximum money supply, in base units
pub const MAX_MONEY: i64 = 21_000_000 * 100_000_000;
