//! Bounty ledger for the world server.
//!
//! Every bounty posted on a player lives in this ledger until it is
//! collected, expires, or is invalidated because one of the players it
//! names has been deleted. Gold that leaves the ledger without being
//! collected is never destroyed: it is credited to the shared bonus pool,
//! which in turn tops up collections on bonus-eligible targets.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`BountyLedger`] struct: postings, bonus pool, queries.
//! - [`posting`] -- The [`PostingBuilder`] for constructing postings.
//! - [`collection`] -- The collusion guard and the collection decision table.
//! - [`expiry`] -- Expiry thresholds and the checkpoint sweep.
//! - [`conservation`] -- Gold conservation verification.
//! - [`directory`] -- The [`PlayerDirectory`] capability and an in-memory [`Roster`].
//! - [`rules`] -- Tunable [`LedgerRules`].
//!
//! # Conservation Law
//!
//! Across a sweep, and across a collection once the payout is added back:
//!
//! ```text
//! bonus_pool + sum(outstanding rewards) == constant
//! ```
//!
//! A violation produces a [`LedgerAnomaly`]. The ledger never panics; it
//! returns errors.
//!
//! # Usage
//!
//! ```
//! use bounty_ledger::{BountyLedger, LedgerRules};
//! use bounty_types::PlayerSerial;
//!
//! let mut ledger = BountyLedger::new(LedgerRules::default());
//! let victim = PlayerSerial(0x10);
//!
//! ledger.post(PlayerSerial(0x01), victim, 1_000, true, None).ok();
//! ledger.post(PlayerSerial(0x02), victim, 200, false, None).ok();
//!
//! assert_eq!(ledger.reward_for_target(victim), 1_200);
//! assert!(ledger.is_eligible_for_bonus(victim));
//! assert_eq!(ledger.unique_target_count(), 1);
//! ```

pub mod collection;
pub mod conservation;
pub mod directory;
pub mod expiry;
pub mod ledger;
pub mod posting;
pub mod rules;

// Re-export primary types at crate root.
pub use collection::{Collection, CollusionReason, can_collect, check_collusion};
pub use conservation::{ConservationResult, GoldTotals, verify_conservation};
pub use directory::{PlayerDirectory, Roster};
pub use expiry::{SweepCause, SweepReport, expires_at, is_expired};
pub use ledger::BountyLedger;
pub use posting::PostingBuilder;
pub use rules::LedgerRules;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when recording postings.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// An internal error that should not occur in normal operation.
    #[error("internal ledger error: {0}")]
    InternalError(&'static str),
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A gold conservation violation detected around a ledger mutation.
///
/// Captures the totals on both sides of the mutation so the host can log
/// exactly how much gold appeared or vanished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// Gold held by the ledger before the mutation.
    pub before: u128,
    /// Gold held by the ledger after the mutation, plus gold paid out.
    pub after: u128,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
