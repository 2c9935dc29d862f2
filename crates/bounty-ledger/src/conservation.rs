//! Gold conservation verification for the bounty ledger.
//!
//! Gold enters the ledger when a bounty is posted and leaves it only when a
//! collector is paid. Sweeping moves gold from postings into the bonus pool
//! and must never change the total. For any mutation:
//!
//! ```text
//! pool_before + outstanding_before == pool_after + outstanding_after + paid_out
//! ```
//!
//! The ledger upholds this by construction; the check exists to catch
//! corruption and future bugs before a bad state is persisted.

use crate::LedgerAnomaly;
use crate::ledger::BountyLedger;

/// The result of a conservation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// No gold appeared or vanished.
    Balanced,
    /// The totals differ.
    Anomaly(LedgerAnomaly),
}

/// Gold held by the ledger at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoldTotals {
    /// Bonus pool balance.
    pub bonus_pool: u64,
    /// Sum of all outstanding rewards.
    pub outstanding: u128,
}

impl GoldTotals {
    /// Snapshot the ledger's gold.
    pub fn of(ledger: &BountyLedger) -> Self {
        Self {
            bonus_pool: ledger.bonus_pool(),
            outstanding: ledger
                .postings()
                .iter()
                .fold(0_u128, |acc, b| acc.saturating_add(u128::from(b.reward))),
        }
    }

    /// Pool plus outstanding rewards.
    pub fn total(&self) -> u128 {
        self.outstanding.saturating_add(u128::from(self.bonus_pool))
    }
}

/// Verify that a mutation moved gold without creating or destroying any.
///
/// `paid_out` is the gold handed to collectors between the two snapshots.
pub fn verify_conservation(
    before: &GoldTotals,
    after: &GoldTotals,
    paid_out: u64,
) -> ConservationResult {
    let expected = before.total();
    let accounted = after.total().saturating_add(u128::from(paid_out));

    if expected == accounted {
        ConservationResult::Balanced
    } else {
        ConservationResult::Anomaly(LedgerAnomaly {
            before: expected,
            after: accounted,
            message: format!(
                "LEDGER_ANOMALY: gold before {expected} != gold after {accounted} (paid out {paid_out})",
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use bounty_types::{DeathHead, PlayerSerial, PlayerView};
    use chrono::{Duration, Utc};

    use super::*;
    use crate::directory::Roster;
    use crate::rules::LedgerRules;

    fn roster(serials: &[u32]) -> Roster {
        let mut roster = Roster::new();
        for &serial in serials {
            roster.insert(PlayerView {
                serial: PlayerSerial(serial),
                name: format!("p{serial}"),
                guild: None,
                account: format!("a{serial}"),
                login_ips: BTreeSet::new(),
                online: true,
                deleted: false,
                is_staff: false,
            });
        }
        roster
    }

    #[test]
    fn unchanged_ledger_balances() {
        let mut ledger = BountyLedger::new(LedgerRules::default());
        let _ = ledger.post(PlayerSerial(1), PlayerSerial(2), 900, true, None);
        let snapshot = ledger.gold_totals();
        assert_eq!(
            verify_conservation(&snapshot, &ledger.gold_totals(), 0),
            ConservationResult::Balanced
        );
    }

    #[test]
    fn sweep_of_invalid_postings_balances() {
        let directory = roster(&[1]);
        let mut ledger = BountyLedger::new(LedgerRules::default());
        let _ = ledger.post(PlayerSerial(1), PlayerSerial(2), 900, true, None);
        let _ = ledger.post(PlayerSerial(1), PlayerSerial(3), 400, false, None);
        ledger.credit_pool(77);

        let before = ledger.gold_totals();
        let report = ledger.sweep(&directory, Utc::now());
        assert_eq!(report.gold_returned, 1_300);
        assert_eq!(
            verify_conservation(&before, &ledger.gold_totals(), 0),
            ConservationResult::Balanced
        );
    }

    #[test]
    fn collection_balances_once_payout_is_counted() {
        let directory = roster(&[1, 2, 3]);
        let mut ledger = BountyLedger::new(LedgerRules::default());
        let _ = ledger.post(PlayerSerial(3), PlayerSerial(2), 900, true, None);
        ledger.credit_pool(200);

        let before = ledger.gold_totals();
        let head = DeathHead {
            victim: PlayerSerial(2),
            killed_at: Utc::now() + Duration::seconds(5),
            player_kill: true,
            friendly_fire: false,
        };
        let collection = ledger.collect(&directory, &head, PlayerSerial(1));

        assert_eq!(collection.gold, 1_100);
        assert_eq!(
            verify_conservation(&before, &ledger.gold_totals(), collection.gold),
            ConservationResult::Balanced
        );
    }

    #[test]
    fn vanished_gold_is_an_anomaly() {
        let before = GoldTotals {
            bonus_pool: 100,
            outstanding: 500,
        };
        let after = GoldTotals {
            bonus_pool: 100,
            outstanding: 400,
        };
        match verify_conservation(&before, &after, 0) {
            ConservationResult::Anomaly(anomaly) => {
                assert_eq!(anomaly.before, 600);
                assert_eq!(anomaly.after, 500);
                assert!(anomaly.message.contains("LEDGER_ANOMALY"));
            }
            ConservationResult::Balanced => {
                assert_eq!(before, after, "expected an anomaly for lost gold");
            }
        }
    }
}
