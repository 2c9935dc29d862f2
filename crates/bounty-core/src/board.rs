//! The host-facing bounty board.
//!
//! [`BountyBoard`] owns the ledger and the world capabilities it needs, and
//! exposes the only entry points a host calls:
//!
//! - [`on_start`] -- load the persisted record (world load)
//! - [`on_checkpoint`] -- sweep, verify, save (world save)
//! - [`post_bounty`] -- a player pledges gold on another player
//! - [`collect_bounty`] -- a player hands in a head
//!
//! Capability failures (treasury, notices) are caught here and logged;
//! they never escape a command, so every collection attempt ends with a
//! receipt.
//!
//! [`on_start`]: BountyBoard::on_start
//! [`on_checkpoint`]: BountyBoard::on_checkpoint
//! [`post_bounty`]: BountyBoard::post_bounty
//! [`collect_bounty`]: BountyBoard::collect_bounty

use chrono::{DateTime, Utc};

use bounty_ledger::{
    BountyLedger, ConservationResult, LedgerAnomaly, LedgerRules, PlayerDirectory, SweepReport,
    verify_conservation,
};
use bounty_store::{BountyStore, StoreError};
use bounty_types::{Bounty, CollectCode, CollectionReceipt, DeathHead, PlayerSerial, PostRejection};

use crate::notice::NoticeBoard;
use crate::treasury::Treasury;

/// Errors surfaced by board lifecycle hooks.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// The record could not be written.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointSummary {
    /// What the sweep removed.
    pub sweep: SweepReport,
    /// Set when gold appeared or vanished during the sweep.
    pub anomaly: Option<LedgerAnomaly>,
}

/// Outcome of loading the record at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartSummary {
    /// Postings restored.
    pub postings: usize,
    /// Persisted postings that were dropped.
    pub dropped: usize,
    /// Restored bonus pool.
    pub bonus_pool: u64,
}

/// The bounty ledger together with the capabilities it acts through.
#[derive(Debug)]
pub struct BountyBoard<D, T, N> {
    ledger: BountyLedger,
    store: BountyStore,
    directory: D,
    treasury: T,
    notices: N,
}

impl<D, T, N> BountyBoard<D, T, N>
where
    D: PlayerDirectory,
    T: Treasury,
    N: NoticeBoard,
{
    /// Create a board with an empty ledger. Call [`on_start`] before
    /// accepting commands.
    ///
    /// [`on_start`]: BountyBoard::on_start
    pub const fn new(
        rules: LedgerRules,
        store: BountyStore,
        directory: D,
        treasury: T,
        notices: N,
    ) -> Self {
        Self {
            ledger: BountyLedger::new(rules),
            store,
            directory,
            treasury,
            notices,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The ledger.
    pub const fn ledger(&self) -> &BountyLedger {
        &self.ledger
    }

    /// The player directory.
    pub const fn directory(&self) -> &D {
        &self.directory
    }

    /// Mutable access to the player directory.
    pub const fn directory_mut(&mut self) -> &mut D {
        &mut self.directory
    }

    /// The treasury.
    pub const fn treasury(&self) -> &T {
        &self.treasury
    }

    /// Mutable access to the treasury.
    pub const fn treasury_mut(&mut self) -> &mut T {
        &mut self.treasury
    }

    /// The notice board.
    pub const fn notices(&self) -> &N {
        &self.notices
    }

    /// Name shown for the placer of a posting.
    pub fn placer_name(&self, bounty: &Bounty) -> Option<String> {
        BountyLedger::placer_display_name(bounty, &self.directory)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// World load: replace the ledger with the persisted record.
    ///
    /// A load failure is logged and leaves an empty ledger with an empty
    /// bonus pool. The notice board is told not to reissue any handle a
    /// restored posting still carries.
    pub fn on_start(&mut self, now: DateTime<Utc>) -> StartSummary {
        let rules = self.ledger.rules().clone();

        let (postings, bonus_pool, dropped) = match self.store.load(&self.directory, now) {
            Ok(loaded) => (loaded.postings, loaded.bonus_pool, loaded.dropped),
            Err(e) => {
                tracing::error!(
                    path = %self.store.path().display(),
                    error = %e,
                    "Failed to load bounty record, starting empty"
                );
                (Vec::new(), 0, 0)
            }
        };

        self.ledger = BountyLedger::restore(rules, postings, bonus_pool);

        // Restored postings keep their handles; new notices must not reuse them.
        if let Some(highest) = self
            .ledger
            .postings()
            .iter()
            .filter_map(|b| b.message_handle)
            .max()
        {
            self.notices.reserve_through(highest);
        }

        let summary = StartSummary {
            postings: self.ledger.len(),
            dropped,
            bonus_pool,
        };
        tracing::info!(
            postings = summary.postings,
            dropped = summary.dropped,
            bonus_pool = summary.bonus_pool,
            targets = self.ledger.unique_target_count(),
            "Bounty board started"
        );
        summary
    }

    /// World save: sweep, verify conservation, take down stale notices,
    /// then write the record.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Store`] if the record could not be written.
    /// The sweep has already been applied in memory and the previous
    /// record is left on disk.
    pub fn on_checkpoint(&mut self, now: DateTime<Utc>) -> Result<CheckpointSummary, BoardError> {
        let before = self.ledger.gold_totals();
        let sweep = self.ledger.sweep(&self.directory, now);

        let anomaly = match verify_conservation(&before, &self.ledger.gold_totals(), 0) {
            ConservationResult::Balanced => None,
            ConservationResult::Anomaly(anomaly) => {
                tracing::error!(
                    before = anomaly.before,
                    after = anomaly.after,
                    "{anomaly}"
                );
                Some(anomaly)
            }
        };

        self.take_down_notices(&sweep.removed);
        self.store.save(&self.ledger)?;

        Ok(CheckpointSummary { sweep, anomaly })
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// A player pledges gold on another player.
    ///
    /// The stake is withdrawn from the placer before the posting is
    /// recorded. Nothing changes when the command is rejected.
    ///
    /// # Errors
    ///
    /// Returns the [`PostRejection`] to show the placer.
    pub fn post_bounty(
        &mut self,
        placer: PlayerSerial,
        target: PlayerSerial,
        amount: u64,
    ) -> Result<Bounty, PostRejection> {
        let rules = self.ledger.rules();
        if amount < rules.min_stake {
            return Err(PostRejection::BelowMinimumStake {
                minimum: rules.min_stake,
                offered: amount,
            });
        }
        let bonus_eligible = rules.bonus_eligible_by_default;

        let placer_view = self
            .directory
            .resolve_live(placer)
            .ok_or(PostRejection::UnknownPlacer)?;
        let target_view = self
            .directory
            .resolve_live(target)
            .ok_or(PostRejection::UnknownTarget)?;
        if target_view.is_staff {
            return Err(PostRejection::StaffTarget);
        }
        if target == placer {
            return Err(PostRejection::SelfTarget);
        }

        if let Err(e) = self.treasury.withdraw(placer, amount) {
            tracing::debug!(placer = %placer, amount, error = %e, "Bounty stake refused");
            return Err(PostRejection::InsufficientFunds);
        }

        let posted = self
            .ledger
            .post(placer, target, amount, bonus_eligible, None)
            .cloned();
        let bounty = match posted {
            Ok(bounty) => bounty,
            Err(e) => {
                tracing::error!(
                    placer = %placer,
                    target = %target,
                    error = %e,
                    "Bounty not recorded, returning stake"
                );
                self.pay(placer, amount);
                return Err(PostRejection::NotRecorded);
            }
        };

        let text = format!(
            "{} has placed a bounty of {amount} gold on the head of {}.",
            placer_view.name, target_view.name
        );
        let handle = match self.notices.post_notice(target, &text) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(target = %target, error = %e, "Bounty notice not posted");
                None
            }
        };
        self.ledger.set_last_message_handle(handle);

        tracing::info!(
            placer = %placer,
            target = %target,
            amount,
            total = self.ledger.reward_for_target(target),
            "Bounty placed"
        );

        Ok(Bounty {
            message_handle: handle,
            ..bounty
        })
    }

    /// A player hands in a head.
    ///
    /// `finder` is the player who looted the head and is only logged. The
    /// head is consumed whenever the receipt says `accepted`.
    pub fn collect_bounty(
        &mut self,
        head: &DeathHead,
        finder: PlayerSerial,
        collector: PlayerSerial,
    ) -> CollectionReceipt {
        let before = self.ledger.gold_totals();
        let collection = self.ledger.collect(&self.directory, head, collector);

        match collection.code {
            CollectCode::NoBounty => {
                let code = if self.notices.has_collected_notice(head.victim) {
                    CollectCode::AlreadyCollected
                } else {
                    CollectCode::InnocentHead
                };
                tracing::debug!(
                    victim = %head.victim,
                    collector = %collector,
                    code = ?code,
                    "Head without bounty"
                );
                return CollectionReceipt::unpaid(code);
            }
            CollectCode::BountyPaid => {}
            code => return CollectionReceipt::unpaid(code),
        }

        if let ConservationResult::Anomaly(anomaly) =
            verify_conservation(&before, &self.ledger.gold_totals(), collection.gold)
        {
            tracing::error!(before = anomaly.before, after = anomaly.after, "{anomaly}");
        }

        self.pay(collector, collection.gold);
        self.take_down_notices(&collection.removed);

        let collector_name = self
            .directory
            .resolve_live(collector)
            .map_or_else(|| collector.to_string(), |p| p.name);
        if let Err(e) = self.notices.announce_collected(head.victim, &collector_name) {
            tracing::warn!(victim = %head.victim, error = %e, "Collection notice not posted");
        }

        tracing::info!(
            victim = %head.victim,
            finder = %finder,
            collector = %collector,
            gold = collection.gold,
            bonus = collection.bonus,
            bonus_pool = self.ledger.bonus_pool(),
            "Bounty paid"
        );

        collection.receipt()
    }

    // -----------------------------------------------------------------------
    // Capability helpers
    // -----------------------------------------------------------------------

    fn pay(&mut self, player: PlayerSerial, amount: u64) {
        if amount == 0 {
            return;
        }
        if let Err(e) = self.treasury.deposit(player, amount) {
            tracing::error!(player = %player, amount, error = %e, "Treasury deposit failed");
        }
    }

    fn take_down_notices(&mut self, removed: &[Bounty]) {
        for handle in removed.iter().filter_map(|b| b.message_handle) {
            if let Err(e) = self.notices.remove_notice(handle) {
                tracing::warn!(handle = %handle, error = %e, "Bounty notice not removed");
            }
        }
    }
}
