//! Ledger arithmetic and thresholds
//!
//! Pure functions shared by the registry, the insurance book and the oracle
//! coordinator. Money math is checked and rounds down in wei.

use crate::error::{LedgerError, LedgerResult};
use shared_types::Wei;

/// Approvals needed to promote an applicant: `ceil(participants / 2)`.
pub fn consensus_threshold(participants: usize) -> usize {
    participants.div_ceil(2)
}

/// Insurance payout for an airline-fault delay.
pub fn compute_payout(premium: Wei, numerator: u128, denominator: u128) -> LedgerResult<Wei> {
    premium
        .checked_mul(numerator)
        .and_then(|scaled| scaled.checked_div(denominator))
        .ok_or_else(|| LedgerError::overflow("payout"))
}

/// Map a 32-byte digest into `0..range` using its low 8 bytes.
pub fn index_from_digest(digest: &[u8; 32], range: u8) -> u8 {
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&digest[24..]);
    let range = u64::from(range.max(1));
    // Result is below `range`, which fits in a u8.
    (u64::from_be_bytes(tail) % range) as u8
}

/// Add to a balance, failing instead of wrapping.
pub fn credit(balance: Wei, amount: Wei, operation: &'static str) -> LedgerResult<Wei> {
    balance
        .checked_add(amount)
        .ok_or_else(|| LedgerError::overflow(operation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{milli_ether, ONE_ETHER};

    #[test]
    fn test_consensus_threshold_rounds_up() {
        assert_eq!(consensus_threshold(1), 1);
        assert_eq!(consensus_threshold(4), 2);
        assert_eq!(consensus_threshold(5), 3);
        assert_eq!(consensus_threshold(6), 3);
    }

    #[test]
    fn test_payout_is_premium_and_a_half() {
        assert_eq!(compute_payout(milli_ether(100), 3, 2).unwrap(), milli_ether(150));
        assert_eq!(compute_payout(ONE_ETHER, 3, 2).unwrap(), ONE_ETHER + ONE_ETHER / 2);
        // Odd wei rounds down
        assert_eq!(compute_payout(3, 3, 2).unwrap(), 4);
    }

    #[test]
    fn test_payout_overflow_is_an_error() {
        let err = compute_payout(u128::MAX, 3, 2).unwrap_err();
        assert_eq!(err, LedgerError::overflow("payout"));
    }

    #[test]
    fn test_index_from_digest_in_range() {
        let mut digest = [0u8; 32];
        digest[31] = 27;
        assert_eq!(index_from_digest(&digest, 10), 7);
        for byte in 0..=255u8 {
            digest[31] = byte;
            assert!(index_from_digest(&digest, 10) < 10);
        }
    }

    #[test]
    fn test_credit_checks_overflow() {
        assert_eq!(credit(1, 2, "test").unwrap(), 3);
        assert!(credit(u128::MAX, 1, "test").is_err());
    }
}
