//! The bounty ledger: every active posting plus the shared bonus pool.
//!
//! The [`BountyLedger`] struct is the in-memory state for the lifetime of
//! the server process. It is populated once from the persisted record at
//! world load, mutated by posting, collection and sweeping, and written
//! back out at every world save.
//!
//! # Design
//!
//! - **Insertion order**: postings keep the order they were made in. Board
//!   pages and display indices depend on it.
//! - **No merging**: several postings on the same target coexist and are
//!   summed at query time.
//! - **Pool never negative**: every debit is clamped to the pool balance.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use bounty_types::{BoardEntry, Bounty, MessageHandle, PlayerSerial};

use crate::conservation::GoldTotals;
use crate::directory::PlayerDirectory;
use crate::rules::LedgerRules;
use crate::{LedgerError, PostingBuilder};

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Process-wide registry of bounty postings.
#[derive(Debug, Default)]
pub struct BountyLedger {
    /// All postings, in insertion order.
    pub(crate) postings: Vec<Bounty>,
    /// Gold returned by expired postings, waiting to be paid out as bonuses.
    pub(crate) bonus_pool: u64,
    /// Balance knobs.
    pub(crate) rules: LedgerRules,
}

impl BountyLedger {
    /// Create a new empty ledger.
    pub const fn new(rules: LedgerRules) -> Self {
        Self {
            postings: Vec::new(),
            bonus_pool: 0,
            rules,
        }
    }

    /// Rebuild a ledger from previously persisted state.
    pub const fn restore(rules: LedgerRules, postings: Vec<Bounty>, bonus_pool: u64) -> Self {
        Self {
            postings,
            bonus_pool,
            rules,
        }
    }

    /// Return the number of postings in the ledger.
    pub const fn len(&self) -> usize {
        self.postings.len()
    }

    /// Return whether the ledger has no postings.
    pub const fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Return the current bonus pool balance.
    pub const fn bonus_pool(&self) -> u64 {
        self.bonus_pool
    }

    /// Return the balance knobs in effect.
    pub const fn rules(&self) -> &LedgerRules {
        &self.rules
    }

    /// Return all postings, in insertion order.
    pub fn postings(&self) -> &[Bounty] {
        &self.postings
    }

    /// Gold currently held by the ledger.
    pub fn gold_totals(&self) -> GoldTotals {
        GoldTotals::of(self)
    }

    /// Append a pre-built [`Bounty`] to the ledger.
    ///
    /// This is for postings that were constructed externally (e.g. loaded
    /// from the persisted record). For new postings, prefer [`post`].
    ///
    /// [`post`]: BountyLedger::post
    pub fn append(&mut self, bounty: Bounty) {
        self.postings.push(bounty);
    }

    /// Post a new bounty stamped with the current time.
    ///
    /// The ledger accepts any amount, zero included; stake minimums are the
    /// command layer's business. Funds must already have been taken from
    /// the placer.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the posting cannot be built.
    pub fn post(
        &mut self,
        placer: PlayerSerial,
        wanted: PlayerSerial,
        amount: u64,
        bonus_eligible: bool,
        placer_name_override: Option<String>,
    ) -> Result<&Bounty, LedgerError> {
        let bounty = PostingBuilder::new(wanted)
            .placer(placer)
            .reward(amount)
            .bonus_eligible(bonus_eligible)
            .placer_name_override(placer_name_override)
            .build()?;

        tracing::debug!(
            wanted = %bounty.wanted,
            placer = %bounty.placer,
            reward = bounty.reward,
            bonus_eligible = bounty.bonus_eligible,
            "Bounty posted"
        );

        self.postings.push(bounty);

        self.postings.last().ok_or(LedgerError::InternalError(
            "failed to retrieve posting after append",
        ))
    }

    /// Attach a notice handle to the most recent posting.
    pub fn set_last_message_handle(&mut self, handle: Option<MessageHandle>) {
        if let Some(last) = self.postings.last_mut() {
            last.message_handle = handle;
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Total gold pledged on a player. Zero if there are no postings.
    pub fn reward_for_target(&self, player: PlayerSerial) -> u64 {
        self.postings
            .iter()
            .filter(|b| b.wanted == player)
            .fold(0_u64, |acc, b| acc.saturating_add(b.reward))
    }

    /// Whether any posting on the player grants bonus eligibility.
    pub fn is_eligible_for_bonus(&self, player: PlayerSerial) -> bool {
        self.postings
            .iter()
            .any(|b| b.wanted == player && b.bonus_eligible)
    }

    /// Number of distinct wanted players.
    pub fn unique_target_count(&self) -> usize {
        self.postings
            .iter()
            .map(|b| b.wanted)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Bonus paid on top of a single eligible collection.
    ///
    /// The pool is split evenly across outstanding targets, then capped so
    /// that a nearly empty board cannot drain the pool in one payout.
    pub fn current_bonus_share(&self) -> u64 {
        let targets = u64::try_from(self.unique_target_count())
            .unwrap_or(u64::MAX)
            .max(1);
        self.bonus_pool
            .checked_div(targets)
            .unwrap_or(0)
            .min(self.rules.bonus_share_cap)
    }

    /// Return the posting shown in board slot `index`.
    ///
    /// Slot 0 is always the first raw posting. Every other slot walks the
    /// postings in insertion order and returns the first posting of the
    /// `index`-th distinct target.
    pub fn get_by_display_index(&self, index: usize) -> Option<&Bounty> {
        if index == 0 {
            return self.postings.first();
        }

        let mut seen = BTreeSet::new();
        self.postings
            .iter()
            .filter(|b| seen.insert(b.wanted))
            .nth(index)
    }

    /// One row per distinct target, in first-seen order.
    pub fn display_entries(&self) -> Vec<BoardEntry> {
        let mut rows: Vec<BoardEntry> = Vec::new();

        for bounty in &self.postings {
            if let Some(row) = rows.iter_mut().find(|r| r.wanted == bounty.wanted) {
                row.total_reward = row.total_reward.saturating_add(bounty.reward);
                row.bonus_eligible |= bounty.bonus_eligible;
                row.postings = row.postings.saturating_add(1);
            } else {
                rows.push(BoardEntry {
                    wanted: bounty.wanted,
                    total_reward: bounty.reward,
                    bonus_eligible: bounty.bonus_eligible,
                    postings: 1,
                });
            }
        }

        rows
    }

    /// One page of board rows. Pages are zero-based.
    pub fn board_page(&self, page: usize, per_page: usize) -> Vec<BoardEntry> {
        if per_page == 0 {
            return Vec::new();
        }
        self.display_entries()
            .into_iter()
            .skip(page.saturating_mul(per_page))
            .take(per_page)
            .collect()
    }

    /// Number of board pages needed for the current targets.
    pub fn board_page_count(&self, per_page: usize) -> usize {
        self.unique_target_count().div_ceil(per_page.max(1))
    }

    /// Name to show for the placer of a posting.
    ///
    /// The override wins; otherwise the placer's live name is looked up.
    pub fn placer_display_name(
        bounty: &Bounty,
        directory: &dyn PlayerDirectory,
    ) -> Option<String> {
        bounty
            .placer_name_override
            .clone()
            .or_else(|| directory.resolve_live(bounty.placer).map(|p| p.name))
    }

    /// Postings on a player made strictly before the given instant.
    pub fn postings_before(
        &self,
        player: PlayerSerial,
        before: DateTime<Utc>,
    ) -> impl Iterator<Item = &Bounty> {
        self.postings
            .iter()
            .filter(move |b| b.wanted == player && b.posted_at < before)
    }

    // -----------------------------------------------------------------------
    // Bonus pool
    // -----------------------------------------------------------------------

    /// Credit gold to the bonus pool.
    pub(crate) const fn credit_pool(&mut self, gold: u64) {
        self.bonus_pool = self.bonus_pool.saturating_add(gold);
    }

    /// Debit gold from the bonus pool, clamped to the balance.
    ///
    /// Returns the amount actually debited.
    pub(crate) fn debit_pool(&mut self, gold: u64) -> u64 {
        let debit = gold.min(self.bonus_pool);
        self.bonus_pool = self.bonus_pool.saturating_sub(debit);
        debit
    }
}
