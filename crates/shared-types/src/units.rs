//! # Currency Units
//!
//! The ledger counts money in the smallest indivisible unit (wei).
//! One currency unit ("ether") is 10^18 wei.

/// Amount of money in the smallest unit.
pub type Wei = u128;

/// One whole currency unit.
pub const ONE_ETHER: Wei = 1_000_000_000_000_000_000;

/// Whole currency units to wei.
pub const fn ether(units: u128) -> Wei {
    units * ONE_ETHER
}

/// Thousandths of a currency unit to wei.
///
/// `milli_ether(150)` is 0.15 units.
pub const fn milli_ether(milli: u128) -> Wei {
    milli * (ONE_ETHER / 1_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_helpers() {
        assert_eq!(ether(10), 10 * ONE_ETHER);
        assert_eq!(milli_ether(1_000), ONE_ETHER);
        assert_eq!(milli_ether(100) * 3 / 2, milli_ether(150));
    }
}
