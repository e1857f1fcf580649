use shared_types::{ether, Wei};

/// Number of indexes assigned to every oracle.
pub const INDEXES_PER_ORACLE: usize = 3;

/// Ledger configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Registered-or-Funded airlines admitted without consensus (genesis included)
    pub bootstrap_quota: usize,
    /// Minimum dues an airline must pay to become Funded
    pub min_funding: Wei,
    /// Maximum premium (and funds sent) per policy
    pub premium_cap: Wei,
    /// Payout = premium * numerator / denominator, rounded down
    pub payout_numerator: u128,
    pub payout_denominator: u128,
    /// Fee an oracle pays to register
    pub oracle_fee: Wei,
    /// Oracle indexes are drawn from `0..index_range`
    pub index_range: u8,
    /// Matching responses needed to finalize a flight status
    pub min_responses: usize,
    /// Seed for the default keccak entropy source
    pub entropy_seed: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            bootstrap_quota: 4,
            min_funding: ether(10),
            premium_cap: ether(1),
            payout_numerator: 3,
            payout_denominator: 2,
            oracle_fee: ether(1),
            index_range: 10,
            min_responses: 3,
            entropy_seed: 0,
        }
    }
}
