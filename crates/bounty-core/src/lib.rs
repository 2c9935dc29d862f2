//! Host-facing bounty board for the world server.
//!
//! This crate wires the [`bounty_ledger`] and [`bounty_store`] crates to the
//! world through three capabilities and exposes the commands and lifecycle
//! hooks the host calls.
//!
//! # Architecture
//!
//! ```text
//! world load  --> BountyBoard::on_start      --> BountyStore::load
//! world save  --> BountyBoard::on_checkpoint --> sweep, verify, BountyStore::save
//! [bounty]    --> BountyBoard::post_bounty   --> Treasury::withdraw, NoticeBoard::post_notice
//! head handed --> BountyBoard::collect_bounty --> Treasury::deposit, NoticeBoard::announce_collected
//! ```
//!
//! # Modules
//!
//! - [`board`] -- [`BountyBoard`]: commands and lifecycle hooks
//! - [`config`] -- [`BountyConfig`] loaded from `bounty-config.yaml`
//! - [`treasury`] -- The [`Treasury`] capability and in-memory [`Bank`]
//! - [`notice`] -- The [`NoticeBoard`] capability and in-memory [`NoticeLog`]
//! - [`roster`] -- Roster file loading for the standalone host

pub mod board;
pub mod config;
pub mod notice;
pub mod roster;
pub mod treasury;

pub use board::{BoardError, BountyBoard, CheckpointSummary, StartSummary};
pub use config::{BountyConfig, ConfigError};
pub use notice::{Notice, NoticeBoard, NoticeError, NoticeLog};
pub use roster::{StandaloneWorld, load_roster, parse_roster};
pub use treasury::{Bank, Treasury, TreasuryError};
