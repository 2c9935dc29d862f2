//! Tunable game-balance constants for the ledger.

use serde::Deserialize;

/// Game-balance knobs consulted by the ledger.
///
/// Deserializes from the `rules` section of the host configuration; every
/// field falls back to the live-server value when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerRules {
    /// Smallest pledge the command layer accepts.
    #[serde(default = "default_min_stake")]
    pub min_stake: u64,

    /// Largest bonus-pool share paid on a single collection.
    #[serde(default = "default_bonus_share_cap")]
    pub bonus_share_cap: u64,

    /// Days a posting of exactly the baseline reward stays up.
    #[serde(default = "default_base_expiry_days")]
    pub base_expiry_days: i64,

    /// Reward at which a posting lives exactly `base_expiry_days`.
    #[serde(default = "default_expiry_baseline_reward")]
    pub expiry_baseline_reward: u64,

    /// Gold above (or below) the baseline that buys (or costs) one hour.
    #[serde(default = "default_gold_per_extra_hour")]
    pub gold_per_extra_hour: u64,

    /// Whether new postings grant bonus eligibility.
    #[serde(default = "default_true")]
    pub bonus_eligible_by_default: bool,
}

impl Default for LedgerRules {
    fn default() -> Self {
        Self {
            min_stake: default_min_stake(),
            bonus_share_cap: default_bonus_share_cap(),
            base_expiry_days: default_base_expiry_days(),
            expiry_baseline_reward: default_expiry_baseline_reward(),
            gold_per_extra_hour: default_gold_per_extra_hour(),
            bonus_eligible_by_default: true,
        }
    }
}

const fn default_min_stake() -> u64 {
    500
}

const fn default_bonus_share_cap() -> u64 {
    300
}

const fn default_base_expiry_days() -> i64 {
    28
}

const fn default_expiry_baseline_reward() -> u64 {
    500
}

const fn default_gold_per_extra_hour() -> u64 {
    100
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_live_server() {
        let rules = LedgerRules::default();
        assert_eq!(rules.min_stake, 500);
        assert_eq!(rules.bonus_share_cap, 300);
        assert_eq!(rules.base_expiry_days, 28);
        assert_eq!(rules.expiry_baseline_reward, 500);
        assert_eq!(rules.gold_per_extra_hour, 100);
        assert!(rules.bonus_eligible_by_default);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let rules: Result<LedgerRules, _> = serde_json::from_str(r#"{"bonus_share_cap": 50}"#);
        let rules = rules.ok().unwrap_or_default();
        assert_eq!(rules.bonus_share_cap, 50);
        assert_eq!(rules.min_stake, 500);
    }
}
