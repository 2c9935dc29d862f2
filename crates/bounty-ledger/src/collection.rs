//! Collusion guard and bounty collection.
//!
//! A head is worth gold only if the collector could not have arranged the
//! kill with the victim. [`check_collusion`] names the first reason a
//! collector is disqualified; [`BountyLedger::collect`] applies the
//! collection decision table:
//!
//! | Condition | Code | Head taken | Effect |
//! |-----------|------|------------|--------|
//! | not a player-kill head | `NotAHead` | no | none |
//! | collusion guard fails | `SuspectedCollusion` | yes | none |
//! | nothing collectible | `NoBounty` | yes | none |
//! | matched rewards + bonus > 0 | `BountyPaid` | yes | pay, debit pool, remove matches |
//!
//! Every outcome except the first consumes the head. A collector who fails
//! the guard learns nothing from getting it back.

use bounty_types::{Bounty, CollectCode, CollectionReceipt, DeathHead, PlayerSerial};

use crate::directory::PlayerDirectory;
use crate::ledger::BountyLedger;

// ---------------------------------------------------------------------------
// Collusion guard
// ---------------------------------------------------------------------------

/// Why a collector may not be paid for a head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollusionReason {
    /// The collector or the victim does not resolve to a live player.
    UnresolvedIdentity,
    /// The collector is the victim.
    SelfCollection,
    /// Collector and victim are in the same guild.
    SameGuild,
    /// Collector's guild is allied with the victim's.
    AlliedGuild,
    /// Both characters belong to the same account.
    SameAccount,
    /// The two accounts have logged in from a common address.
    SharedLoginAddress,
    /// The combat system flagged the kill as friendly fire.
    FriendlyFire,
}

/// Return the first reason the collector is disqualified, if any.
pub fn check_collusion(
    directory: &dyn PlayerDirectory,
    collector: PlayerSerial,
    deceased: PlayerSerial,
    friendly_fire: bool,
) -> Option<CollusionReason> {
    let (Some(hunter), Some(victim)) = (
        directory.resolve_live(collector),
        directory.resolve_live(deceased),
    ) else {
        return Some(CollusionReason::UnresolvedIdentity);
    };

    if hunter.serial == victim.serial {
        return Some(CollusionReason::SelfCollection);
    }

    if let (Some(hunter_guild), Some(victim_guild)) = (hunter.guild, victim.guild) {
        if hunter_guild == victim_guild {
            return Some(CollusionReason::SameGuild);
        }
        if directory.are_allied(hunter_guild, victim_guild) {
            return Some(CollusionReason::AlliedGuild);
        }
    }

    if hunter.account == victim.account {
        return Some(CollusionReason::SameAccount);
    }

    if hunter.shares_login_address(&victim) {
        return Some(CollusionReason::SharedLoginAddress);
    }

    if friendly_fire {
        return Some(CollusionReason::FriendlyFire);
    }

    None
}

/// Whether the collector may be paid for the deceased's head.
pub fn can_collect(
    directory: &dyn PlayerDirectory,
    collector: PlayerSerial,
    deceased: PlayerSerial,
    friendly_fire: bool,
) -> bool {
    check_collusion(directory, collector, deceased, friendly_fire).is_none()
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// Ledger-side result of a collection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// What happened.
    pub code: CollectCode,
    /// Gold owed to the collector: matched rewards plus bonus.
    pub gold: u64,
    /// The part of `gold` that came out of the bonus pool.
    pub bonus: u64,
    /// The postings consumed by this collection.
    pub removed: Vec<Bounty>,
    /// Set when the collusion guard rejected the collector.
    pub collusion: Option<CollusionReason>,
}

impl Collection {
    const fn unpaid(code: CollectCode) -> Self {
        Self {
            code,
            gold: 0,
            bonus: 0,
            removed: Vec::new(),
            collusion: None,
        }
    }

    /// Convert into the receipt handed back to the command layer.
    pub const fn receipt(&self) -> CollectionReceipt {
        CollectionReceipt {
            accepted: self.code.accepted(),
            gold_given: self.gold,
            code: self.code,
        }
    }
}

impl BountyLedger {
    /// Apply the collection decision table to a head.
    ///
    /// Only postings made strictly before the victim's death count. The
    /// bonus share is added when any of those postings is bonus eligible.
    /// Moving the gold to the collector is the caller's job; the ledger
    /// only removes the matched postings and debits the bonus pool.
    pub fn collect(
        &mut self,
        directory: &dyn PlayerDirectory,
        head: &DeathHead,
        collector: PlayerSerial,
    ) -> Collection {
        if !head.player_kill {
            return Collection::unpaid(CollectCode::NotAHead);
        }

        if let Some(reason) = check_collusion(directory, collector, head.victim, head.friendly_fire)
        {
            tracing::info!(
                collector = %collector,
                victim = %head.victim,
                reason = ?reason,
                "Bounty collection refused"
            );
            return Collection {
                collusion: Some(reason),
                ..Collection::unpaid(CollectCode::SuspectedCollusion)
            };
        }

        let mut matched = 0_usize;
        let mut reward = 0_u64;
        let mut eligible = false;
        for bounty in self.postings_before(head.victim, head.killed_at) {
            matched = matched.saturating_add(1);
            reward = reward.saturating_add(bounty.reward);
            eligible |= bounty.bonus_eligible;
        }

        if matched == 0 {
            return Collection::unpaid(CollectCode::NoBounty);
        }

        // Share is computed while the victim still counts as a target.
        let share = if eligible { self.current_bonus_share() } else { 0 };
        if reward.saturating_add(share) == 0 {
            return Collection::unpaid(CollectCode::NoBounty);
        }

        let (removed, kept): (Vec<Bounty>, Vec<Bounty>) = self
            .postings
            .drain(..)
            .partition(|b| b.wanted == head.victim && b.posted_at < head.killed_at);
        self.postings = kept;

        let bonus = self.debit_pool(share);
        let gold = reward.saturating_add(bonus);

        tracing::info!(
            collector = %collector,
            victim = %head.victim,
            reward,
            bonus,
            postings = removed.len(),
            "Bounty collected"
        );

        Collection {
            code: CollectCode::BountyPaid,
            gold,
            bonus,
            removed,
            collusion: None,
        }
    }
}
