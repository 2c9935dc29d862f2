//! Public announcement capability.
//!
//! Each posting may have a notice on the town criers' board. The board
//! also remembers which heads have already been cashed in, so a late
//! collector can be told the bounty was already collected rather than that
//! the victim was innocent. A new bounty on the victim clears that memory.

use std::collections::{BTreeMap, BTreeSet};

use bounty_types::{MessageHandle, PlayerSerial};

/// Errors raised by a notice board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoticeError {
    /// No notice with this handle exists.
    #[error("no notice with handle {0}")]
    UnknownHandle(MessageHandle),

    /// The board cannot take more notices.
    #[error("notice board is full")]
    Full,
}

/// Posts and withdraws public notices.
pub trait NoticeBoard {
    /// Post a notice about a new bounty.
    ///
    /// # Errors
    ///
    /// Returns [`NoticeError`] if the notice cannot be posted.
    fn post_notice(&mut self, wanted: PlayerSerial, text: &str)
    -> Result<MessageHandle, NoticeError>;

    /// Take a notice down.
    ///
    /// # Errors
    ///
    /// Returns [`NoticeError::UnknownHandle`] if the notice is gone.
    fn remove_notice(&mut self, handle: MessageHandle) -> Result<(), NoticeError>;

    /// Announce that the bounty on `victim` was collected.
    ///
    /// # Errors
    ///
    /// Returns [`NoticeError`] if the announcement cannot be posted.
    fn announce_collected(
        &mut self,
        victim: PlayerSerial,
        collector_name: &str,
    ) -> Result<(), NoticeError>;

    /// Whether a collected announcement exists for `victim`.
    fn has_collected_notice(&self, victim: PlayerSerial) -> bool;

    /// Never hand out `handle` or any lower handle again.
    ///
    /// Called after restoring postings that still carry handles from an
    /// earlier run.
    fn reserve_through(&mut self, handle: MessageHandle);
}

/// A notice as held by [`NoticeLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// The player the notice is about.
    pub wanted: PlayerSerial,
    /// Announcement text.
    pub text: String,
}

/// In-memory notice board.
#[derive(Debug, Clone, Default)]
pub struct NoticeLog {
    notices: BTreeMap<MessageHandle, Notice>,
    collected: BTreeSet<PlayerSerial>,
    next_handle: u64,
}

impl NoticeLog {
    /// Create an empty board.
    pub const fn new() -> Self {
        Self {
            notices: BTreeMap::new(),
            collected: BTreeSet::new(),
            next_handle: 0,
        }
    }

    /// Look up a live notice.
    pub fn get(&self, handle: MessageHandle) -> Option<&Notice> {
        self.notices.get(&handle)
    }

    /// Number of live bounty notices.
    pub fn len(&self) -> usize {
        self.notices.len()
    }

    /// Whether no bounty notices are up.
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

impl NoticeBoard for NoticeLog {
    fn post_notice(
        &mut self,
        wanted: PlayerSerial,
        text: &str,
    ) -> Result<MessageHandle, NoticeError> {
        // Handles start at 1; zero means "no notice" in the record.
        let next = self.next_handle.checked_add(1).ok_or(NoticeError::Full)?;
        self.next_handle = next;
        let handle = MessageHandle(next);
        self.collected.remove(&wanted);
        self.notices.insert(
            handle,
            Notice {
                wanted,
                text: text.to_owned(),
            },
        );
        Ok(handle)
    }

    fn remove_notice(&mut self, handle: MessageHandle) -> Result<(), NoticeError> {
        self.notices
            .remove(&handle)
            .map(|_| ())
            .ok_or(NoticeError::UnknownHandle(handle))
    }

    fn announce_collected(
        &mut self,
        victim: PlayerSerial,
        collector_name: &str,
    ) -> Result<(), NoticeError> {
        tracing::debug!(victim = %victim, collector = collector_name, "Collected notice posted");
        self.collected.insert(victim);
        Ok(())
    }

    fn has_collected_notice(&self, victim: PlayerSerial) -> bool {
        self.collected.contains(&victim)
    }

    fn reserve_through(&mut self, handle: MessageHandle) {
        self.next_handle = self.next_handle.max(handle.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_never_zero() {
        let mut board = NoticeLog::new();
        let handle = board.post_notice(PlayerSerial(9), "wanted");
        assert_eq!(handle, Ok(MessageHandle(1)));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn removing_twice_fails() {
        let mut board = NoticeLog::new();
        let handle = board
            .post_notice(PlayerSerial(9), "wanted")
            .unwrap_or(MessageHandle(1));
        assert!(board.remove_notice(handle).is_ok());
        assert_eq!(
            board.remove_notice(handle),
            Err(NoticeError::UnknownHandle(handle))
        );
        assert!(board.is_empty());
    }

    #[test]
    fn collected_notices_are_remembered() {
        let mut board = NoticeLog::new();
        assert!(!board.has_collected_notice(PlayerSerial(9)));
        assert!(board.announce_collected(PlayerSerial(9), "hunter").is_ok());
        assert!(board.has_collected_notice(PlayerSerial(9)));
        assert!(!board.has_collected_notice(PlayerSerial(10)));
    }

    #[test]
    fn new_bounty_clears_collected_notice() {
        let mut board = NoticeLog::new();
        let _ = board.announce_collected(PlayerSerial(9), "hunter");
        let _ = board.post_notice(PlayerSerial(10), "other");
        assert!(board.has_collected_notice(PlayerSerial(9)));

        let _ = board.post_notice(PlayerSerial(9), "wanted again");
        assert!(!board.has_collected_notice(PlayerSerial(9)));
    }

    #[test]
    fn reserved_handles_are_skipped() {
        let mut board = NoticeLog::new();
        board.reserve_through(MessageHandle(41));
        assert_eq!(board.post_notice(PlayerSerial(9), "wanted"), Ok(MessageHandle(42)));

        // Reserving below the counter never rewinds it.
        board.reserve_through(MessageHandle(3));
        assert_eq!(board.post_notice(PlayerSerial(9), "wanted"), Ok(MessageHandle(43)));
    }
}
