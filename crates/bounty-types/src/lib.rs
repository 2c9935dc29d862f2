//! Shared type definitions for the bounty ledger.
//!
//! This crate is the single source of truth for the value types passed
//! between the ledger, its persisted record, and the world host.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for player serials, guild ids and notice handles
//! - [`enums`] -- Collection result codes and posting rejections
//! - [`structs`] -- Postings, player snapshots, heads and board rows

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{CollectCode, PostRejection};
pub use ids::{GuildId, MessageHandle, PlayerSerial};
pub use structs::{BoardEntry, Bounty, CollectionReceipt, DeathHead, PlayerView};
