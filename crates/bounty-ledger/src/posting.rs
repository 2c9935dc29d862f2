//! Posting builder for the bounty ledger.
//!
//! Provides a [`PostingBuilder`] that every [`Bounty`] passes through,
//! whether it is posted live or rebuilt from the persisted record. The
//! builder normalizes optional fields: a blank placer name override is the
//! same as no override, and a zero notice handle is the same as none.

use chrono::{DateTime, Utc};

use bounty_types::{Bounty, MessageHandle, PlayerSerial};

use crate::LedgerError;

// ---------------------------------------------------------------------------
// Posting builder
// ---------------------------------------------------------------------------

/// Builder for constructing [`Bounty`] values.
///
/// # Examples
///
/// ```
/// use bounty_ledger::PostingBuilder;
/// use bounty_types::PlayerSerial;
///
/// let bounty = PostingBuilder::new(PlayerSerial(0x20))
///     .placer(PlayerSerial(0x21))
///     .reward(750)
///     .bonus_eligible(true)
///     .build();
///
/// assert!(bounty.is_ok());
/// ```
#[derive(Debug)]
pub struct PostingBuilder {
    wanted: PlayerSerial,
    placer: Option<PlayerSerial>,
    placer_name_override: Option<String>,
    reward: Option<u64>,
    bonus_eligible: bool,
    posted_at: Option<DateTime<Utc>>,
    message_handle: Option<MessageHandle>,
}

impl PostingBuilder {
    /// Start building a posting on the given target.
    pub const fn new(wanted: PlayerSerial) -> Self {
        Self {
            wanted,
            placer: None,
            placer_name_override: None,
            reward: None,
            bonus_eligible: false,
            posted_at: None,
            message_handle: None,
        }
    }

    /// Set the player who pledged the gold.
    #[must_use]
    pub const fn placer(mut self, placer: PlayerSerial) -> Self {
        self.placer = Some(placer);
        self
    }

    /// Set the display name shown instead of the placer's live name.
    #[must_use]
    pub fn placer_name_override(mut self, name: Option<String>) -> Self {
        self.placer_name_override = name.filter(|n| !n.trim().is_empty());
        self
    }

    /// Set the pledged gold.
    #[must_use]
    pub const fn reward(mut self, reward: u64) -> Self {
        self.reward = Some(reward);
        self
    }

    /// Set whether the posting makes the target bonus eligible.
    #[must_use]
    pub const fn bonus_eligible(mut self, eligible: bool) -> Self {
        self.bonus_eligible = eligible;
        self
    }

    /// Set the posting time. Defaults to now when left unset.
    #[must_use]
    pub const fn posted_at(mut self, at: DateTime<Utc>) -> Self {
        self.posted_at = Some(at);
        self
    }

    /// Attach the handle of a public notice.
    #[must_use]
    pub const fn message_handle(mut self, handle: Option<MessageHandle>) -> Self {
        self.message_handle = match handle {
            Some(MessageHandle(0)) | None => None,
            Some(h) => Some(h),
        };
        self
    }

    /// Validate inputs and produce a [`Bounty`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingField`] if the placer or reward is not set.
    pub fn build(self) -> Result<Bounty, LedgerError> {
        let placer = self.placer.ok_or(LedgerError::MissingField("placer"))?;
        let reward = self.reward.ok_or(LedgerError::MissingField("reward"))?;

        Ok(Bounty {
            wanted: self.wanted,
            placer,
            placer_name_override: self.placer_name_override,
            reward,
            bonus_eligible: self.bonus_eligible,
            posted_at: self.posted_at.unwrap_or_else(Utc::now),
            message_handle: self.message_handle,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn missing_placer_is_rejected() {
        let result = PostingBuilder::new(PlayerSerial(1)).reward(10).build();
        assert!(matches!(result, Err(LedgerError::MissingField("placer"))));
    }

    #[test]
    fn missing_reward_is_rejected() {
        let result = PostingBuilder::new(PlayerSerial(1))
            .placer(PlayerSerial(2))
            .build();
        assert!(matches!(result, Err(LedgerError::MissingField("reward"))));
    }

    #[test]
    fn zero_reward_is_accepted() {
        let result = PostingBuilder::new(PlayerSerial(1))
            .placer(PlayerSerial(2))
            .reward(0)
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn blank_override_and_zero_handle_normalize_to_none() {
        let bounty = PostingBuilder::new(PlayerSerial(1))
            .placer(PlayerSerial(2))
            .reward(500)
            .placer_name_override(Some("   ".to_owned()))
            .message_handle(Some(MessageHandle(0)))
            .build();
        let bounty = bounty.ok();
        assert_eq!(bounty.as_ref().and_then(|b| b.placer_name_override.clone()), None);
        assert_eq!(bounty.and_then(|b| b.message_handle), None);
    }

    #[test]
    fn explicit_timestamp_is_kept() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single();
        let mut builder = PostingBuilder::new(PlayerSerial(1))
            .placer(PlayerSerial(2))
            .reward(500);
        if let Some(at) = at {
            builder = builder.posted_at(at);
        }
        let bounty = builder.build().ok();
        assert_eq!(bounty.map(|b| b.posted_at), at);
    }
}
