//! Core structs shared between the ledger, the store, and the host.

use std::collections::BTreeSet;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::CollectCode;
use crate::ids::{GuildId, MessageHandle, PlayerSerial};

// ---------------------------------------------------------------------------
// Bounty
// ---------------------------------------------------------------------------

/// A single bounty posting.
///
/// Players are referenced by serial only. The posting never owns the
/// players it names; they are resolved through a directory at the moment
/// they are needed, and a serial that no longer resolves makes the posting
/// invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounty {
    /// The player with a price on their head.
    pub wanted: PlayerSerial,
    /// The player who pledged the gold.
    pub placer: PlayerSerial,
    /// Display name shown instead of the placer's live name, if set.
    pub placer_name_override: Option<String>,
    /// Gold pledged.
    pub reward: u64,
    /// Whether collecting this target also pays a share of the bonus pool.
    pub bonus_eligible: bool,
    /// When the posting was made. Always UTC.
    pub posted_at: DateTime<Utc>,
    /// Handle of the related public notice, if one was posted.
    pub message_handle: Option<MessageHandle>,
}

// ---------------------------------------------------------------------------
// PlayerView
// ---------------------------------------------------------------------------

/// Read-only snapshot of a player as resolved from the world host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// The player's serial.
    pub serial: PlayerSerial,
    /// Current character name.
    pub name: String,
    /// Guild membership, if any.
    pub guild: Option<GuildId>,
    /// Login account that owns the character.
    pub account: String,
    /// Every address the owning account has logged in from.
    pub login_ips: BTreeSet<IpAddr>,
    /// Whether the player is currently connected.
    pub online: bool,
    /// Whether the character has been deleted.
    pub deleted: bool,
    /// Whether the character belongs to server staff.
    pub is_staff: bool,
}

impl PlayerView {
    /// A live player is one that exists and has not been deleted.
    pub const fn is_live(&self) -> bool {
        !self.deleted
    }

    /// Whether the two players' accounts share any login address.
    pub fn shares_login_address(&self, other: &Self) -> bool {
        !self.login_ips.is_disjoint(&other.login_ips)
    }
}

// ---------------------------------------------------------------------------
// DeathHead
// ---------------------------------------------------------------------------

/// A severed head: the proof of a kill handed to a bounty collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathHead {
    /// The player the head belonged to.
    pub victim: PlayerSerial,
    /// When the victim died.
    pub killed_at: DateTime<Utc>,
    /// Whether the victim was killed by another player.
    pub player_kill: bool,
    /// Whether the combat system flagged the kill as friendly fire.
    pub friendly_fire: bool,
}

// ---------------------------------------------------------------------------
// Board views
// ---------------------------------------------------------------------------

/// One row of the public bounty board: every posting on a target, summed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardEntry {
    /// The wanted player.
    pub wanted: PlayerSerial,
    /// Sum of all rewards on the target.
    pub total_reward: u64,
    /// Whether any posting on the target is bonus eligible.
    pub bonus_eligible: bool,
    /// Number of separate postings on the target.
    pub postings: usize,
}

/// Result of a collection attempt, as returned to the command layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionReceipt {
    /// Whether the collector took the head.
    pub accepted: bool,
    /// Gold handed to the collector.
    pub gold_given: u64,
    /// Why.
    pub code: CollectCode,
}

impl CollectionReceipt {
    /// A receipt that pays nothing.
    pub const fn unpaid(code: CollectCode) -> Self {
        Self {
            accepted: code.accepted(),
            gold_given: 0,
            code,
        }
    }
}
