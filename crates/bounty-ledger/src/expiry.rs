//! Expiry thresholds and the checkpoint sweep.
//!
//! A posting stays on the board for a base period, lengthened by one hour
//! for every `gold_per_extra_hour` pledged above the baseline reward and
//! shortened the same way below it. With the live rules a 500 gold posting
//! lasts exactly 28 days and a 1500 gold posting lasts 28 days 10 hours.
//! Only whole hours count: the gold difference is divided by
//! `gold_per_extra_hour` and truncated toward zero, so 550 gold still lasts
//! exactly 28 days.
//!
//! The sweep also purges postings that name players who no longer exist.
//! Gold on every removed posting goes to the bonus pool.

use chrono::{DateTime, Duration, Utc};

use bounty_types::{Bounty, PlayerSerial};

use crate::directory::PlayerDirectory;
use crate::ledger::BountyLedger;
use crate::rules::LedgerRules;

/// Seconds in an hour.
const SECONDS_PER_HOUR: i128 = 3_600;

/// When a posting stops being valid.
///
/// Saturates at the representable date range instead of overflowing.
pub fn expires_at(bounty: &Bounty, rules: &LedgerRules) -> DateTime<Utc> {
    let base = Duration::try_days(rules.base_expiry_days).unwrap_or(Duration::MAX);

    let surplus = i128::from(bounty.reward).saturating_sub(i128::from(rules.expiry_baseline_reward));
    let per_hour = i128::from(rules.gold_per_extra_hour.max(1));
    let extra_hours = surplus.checked_div(per_hour).unwrap_or(0);
    let extra_secs = extra_hours.saturating_mul(SECONDS_PER_HOUR);
    let extra_secs = i64::try_from(extra_secs).unwrap_or(if extra_secs < 0 {
        i64::MIN
    } else {
        i64::MAX
    });
    let extra = Duration::try_seconds(extra_secs).unwrap_or(if extra_secs < 0 {
        Duration::MIN
    } else {
        Duration::MAX
    });

    let window = base.checked_add(&extra).unwrap_or(Duration::MAX);
    bounty
        .posted_at
        .checked_add_signed(window)
        .unwrap_or(if window < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

/// Whether a posting has run out its time at `now`.
pub fn is_expired(bounty: &Bounty, rules: &LedgerRules, now: DateTime<Utc>) -> bool {
    now >= expires_at(bounty, rules)
}

/// Why a posting was swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepCause {
    /// The posting outlived its window.
    Expired,
    /// The wanted player no longer exists.
    WantedGone,
    /// The placer no longer exists and no override name is set.
    PlacerGone,
}

/// Summary of one sweep pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Postings removed because their window closed.
    pub expired: usize,
    /// Postings removed because a named player is gone.
    pub invalidated: usize,
    /// Gold credited to the bonus pool.
    pub gold_returned: u64,
    /// The removed postings, in their original order.
    pub removed: Vec<Bounty>,
}

impl SweepReport {
    /// Whether the sweep removed anything.
    pub const fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

fn resolves(directory: &dyn PlayerDirectory, serial: PlayerSerial) -> bool {
    directory.resolve_live(serial).is_some()
}

impl BountyLedger {
    /// Decide whether a posting should be swept, and why.
    pub fn sweep_cause(
        &self,
        bounty: &Bounty,
        directory: &dyn PlayerDirectory,
        now: DateTime<Utc>,
    ) -> Option<SweepCause> {
        if !resolves(directory, bounty.wanted) {
            return Some(SweepCause::WantedGone);
        }
        if bounty.placer_name_override.is_none() && !resolves(directory, bounty.placer) {
            return Some(SweepCause::PlacerGone);
        }
        if is_expired(bounty, &self.rules, now) {
            return Some(SweepCause::Expired);
        }
        None
    }

    /// Remove expired and invalid postings, returning their gold to the pool.
    ///
    /// Runs once per checkpoint, before the ledger is written out.
    pub fn sweep(&mut self, directory: &dyn PlayerDirectory, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();
        let mut kept = Vec::with_capacity(self.postings.len());

        for bounty in std::mem::take(&mut self.postings) {
            match self.sweep_cause(&bounty, directory, now) {
                None => kept.push(bounty),
                Some(cause) => {
                    tracing::debug!(
                        wanted = %bounty.wanted,
                        placer = %bounty.placer,
                        reward = bounty.reward,
                        cause = ?cause,
                        "Bounty swept"
                    );
                    if cause == SweepCause::Expired {
                        report.expired = report.expired.saturating_add(1);
                    } else {
                        report.invalidated = report.invalidated.saturating_add(1);
                    }
                    report.gold_returned = report.gold_returned.saturating_add(bounty.reward);
                    report.removed.push(bounty);
                }
            }
        }

        self.postings = kept;
        self.credit_pool(report.gold_returned);

        if !report.is_empty() {
            tracing::info!(
                expired = report.expired,
                invalidated = report.invalidated,
                gold_returned = report.gold_returned,
                bonus_pool = self.bonus_pool,
                "Bounty sweep complete"
            );
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use bounty_types::PlayerView;
    use chrono::TimeZone;

    use super::*;
    use crate::PostingBuilder;
    use crate::directory::Roster;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn bounty(wanted: u32, placer: u32, reward: u64, posted_at: DateTime<Utc>) -> Bounty {
        PostingBuilder::new(PlayerSerial(wanted))
            .placer(PlayerSerial(placer))
            .reward(reward)
            .posted_at(posted_at)
            .build()
            .unwrap_or_else(|_| Bounty {
                wanted: PlayerSerial(wanted),
                placer: PlayerSerial(placer),
                placer_name_override: None,
                reward,
                bonus_eligible: false,
                posted_at,
                message_handle: None,
            })
    }

    fn roster(serials: &[u32]) -> Roster {
        let mut roster = Roster::new();
        for &serial in serials {
            roster.insert(PlayerView {
                serial: PlayerSerial(serial),
                name: format!("p{serial}"),
                guild: None,
                account: format!("a{serial}"),
                login_ips: BTreeSet::new(),
                online: false,
                deleted: false,
                is_staff: false,
            });
        }
        roster
    }

    #[test]
    fn baseline_reward_lasts_exactly_base_window() {
        let rules = LedgerRules::default();
        let b = bounty(1, 2, 500, at(1));
        assert_eq!(expires_at(&b, &rules), at(29));
    }

    #[test]
    fn larger_rewards_last_longer() {
        let rules = LedgerRules::default();
        let b = bounty(1, 2, 1_500, at(1));
        assert_eq!(expires_at(&b, &rules), at(29) + Duration::hours(10));
    }

    #[test]
    fn smaller_rewards_expire_sooner() {
        let rules = LedgerRules::default();
        let b = bounty(1, 2, 300, at(1));
        assert_eq!(expires_at(&b, &rules), at(29) - Duration::hours(2));

    }

    #[test]
    fn partial_hours_are_truncated_toward_zero() {
        let rules = LedgerRules::default();
        assert_eq!(expires_at(&bounty(1, 2, 550, at(1)), &rules), at(29));
        assert_eq!(expires_at(&bounty(1, 2, 699, at(1)), &rules), at(29) + Duration::hours(1));
        assert_eq!(expires_at(&bounty(1, 2, 450, at(1)), &rules), at(29));
        assert_eq!(expires_at(&bounty(1, 2, 350, at(1)), &rules), at(29) - Duration::hours(1));
    }

    #[test]
    fn expiry_is_inclusive_of_threshold() {
        let rules = LedgerRules::default();
        let b = bounty(1, 2, 500, at(1));
        assert!(!is_expired(&b, &rules, at(29) - Duration::seconds(1)));
        assert!(is_expired(&b, &rules, at(29)));
    }

    #[test]
    fn sweep_returns_gold_to_pool() {
        let directory = roster(&[1, 2, 3]);
        let mut ledger = BountyLedger::new(LedgerRules::default());
        ledger.append(bounty(1, 2, 500, at(1)));
        ledger.append(bounty(3, 2, 900, at(20)));

        let before = ledger.gold_totals();
        let report = ledger.sweep(&directory, at(30));

        assert_eq!(report.expired, 1);
        assert_eq!(report.gold_returned, 500);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.bonus_pool(), 500);
        assert_eq!(before.total(), ledger.gold_totals().total());
    }

    #[test]
    fn sweep_purges_deleted_players() {
        let mut directory = roster(&[1, 2, 3, 4]);
        let mut ledger = BountyLedger::new(LedgerRules::default());
        ledger.append(bounty(1, 2, 700, at(10)));
        ledger.append(bounty(3, 4, 600, at(10)));
        directory.mark_deleted(PlayerSerial(1));
        directory.remove(PlayerSerial(4));

        let report = ledger.sweep(&directory, at(11));
        assert_eq!(report.invalidated, 2);
        assert_eq!(report.gold_returned, 1_300);
        assert!(ledger.is_empty());
    }

    #[test]
    fn placer_override_survives_deleted_placer() {
        let directory = roster(&[1]);
        let mut ledger = BountyLedger::new(LedgerRules::default());
        let mut b = bounty(1, 2, 700, at(10));
        b.placer_name_override = Some("The Crown".to_owned());
        ledger.append(b);

        let report = ledger.sweep(&directory, at(11));
        assert!(report.is_empty());
        assert_eq!(ledger.len(), 1);
    }
}
