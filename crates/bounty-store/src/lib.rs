//! Persistence for the bounty ledger.
//!
//! The ledger is saved as a JSON Lines record: a root line carrying the
//! bonus pool, then one line per posting. Saves are whole-file and atomic.
//! Loads are tolerant: malformed lines and postings on players that no
//! longer exist are logged and skipped, never fatal.
//!
//! # Modules
//!
//! - [`file_store`] -- [`BountyStore`]: load and atomic save
//! - [`record`] -- Root and posting line formats
//! - [`timestamp`] -- Ordered timestamp parsing strategies
//! - [`error`] -- Shared error types

pub mod error;
pub mod file_store;
pub mod record;
pub mod timestamp;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use file_store::{BountyStore, DropReason, LoadedLedger};
pub use record::{PostingRecord, RootRecord};
pub use timestamp::{format_timestamp, parse_timestamp};
