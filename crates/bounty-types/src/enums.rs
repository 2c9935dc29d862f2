//! Enumeration types for the bounty ledger.
//!
//! Result codes returned to the host's command layer. The host turns these
//! into localized player messages; the [`message`] helpers give the default
//! English text.
//!
//! [`message`]: CollectCode::message

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Collection result codes
// ---------------------------------------------------------------------------

/// Outcome of handing a severed head to a bounty collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectCode {
    /// The item is not the head of a player killed by a player.
    NotAHead,
    /// The collector failed the collusion guard. The head is taken anyway.
    SuspectedCollusion,
    /// The ledger holds no collectible reward for this head. The host
    /// refines this into [`InnocentHead`] or [`AlreadyCollected`].
    ///
    /// [`InnocentHead`]: CollectCode::InnocentHead
    /// [`AlreadyCollected`]: CollectCode::AlreadyCollected
    NoBounty,
    /// No bounty was ever on this player.
    InnocentHead,
    /// A bounty existed but somebody else already collected it.
    AlreadyCollected,
    /// The reward was paid out.
    BountyPaid,
}

impl CollectCode {
    /// Default player-facing text for this code.
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotAHead => "I have no interest in that.",
            Self::SuspectedCollusion => {
                "I suspect treachery. I'll take that head, but you'll see no gold for it."
            }
            Self::NoBounty | Self::InnocentHead => {
                "There was no bounty on this one. I'll take it off your hands all the same."
            }
            Self::AlreadyCollected => {
                "The bounty on this one has already been claimed. I'll take it anyway."
            }
            Self::BountyPaid => "Well done. Here is your reward.",
        }
    }

    /// Whether the collector keeps the head after this outcome.
    ///
    /// Only a non-head is handed back; every other outcome consumes it.
    pub const fn accepted(self) -> bool {
        !matches!(self, Self::NotAHead)
    }
}

// ---------------------------------------------------------------------------
// Posting rejections
// ---------------------------------------------------------------------------

/// Reason a bounty posting was refused before reaching the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostRejection {
    /// The pledged amount is below the configured minimum stake.
    BelowMinimumStake {
        /// The configured minimum.
        minimum: u64,
        /// The amount offered.
        offered: u64,
    },
    /// The placer does not resolve to a live player.
    UnknownPlacer,
    /// The target does not resolve to a live player.
    UnknownTarget,
    /// The target is a staff character.
    StaffTarget,
    /// The placer tried to post a bounty on themselves.
    SelfTarget,
    /// The placer cannot cover the amount.
    InsufficientFunds,
    /// The stake was taken but the ledger refused the posting; the stake
    /// has been returned.
    NotRecorded,
}

impl core::fmt::Display for PostRejection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BelowMinimumStake { minimum, offered } => write!(
                f,
                "A bounty must be at least {minimum} gold; {offered} is not enough."
            ),
            Self::UnknownPlacer => write!(f, "You cannot place a bounty right now."),
            Self::UnknownTarget => write!(f, "That is not a player."),
            Self::StaffTarget => write!(f, "You cannot place a bounty on staff."),
            Self::SelfTarget => write!(f, "You cannot place a bounty on yourself."),
            Self::InsufficientFunds => write!(f, "You do not have enough gold in your bank."),
            Self::NotRecorded => {
                write!(f, "The bounty could not be recorded; your gold was returned.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_non_heads_are_refused() {
        assert!(!CollectCode::NotAHead.accepted());
        assert!(CollectCode::SuspectedCollusion.accepted());
        assert!(CollectCode::NoBounty.accepted());
        assert!(CollectCode::AlreadyCollected.accepted());
        assert!(CollectCode::BountyPaid.accepted());
    }

    #[test]
    fn stake_rejection_names_the_minimum() {
        let text = PostRejection::BelowMinimumStake {
            minimum: 500,
            offered: 20,
        }
        .to_string();
        assert!(text.contains("500"));
        assert!(text.contains("20"));
    }
}
