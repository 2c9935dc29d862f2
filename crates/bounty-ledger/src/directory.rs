//! Player lookup capability.
//!
//! The ledger stores player serials, never player objects. Whenever it
//! needs a name, a guild, or proof that a player still exists, it asks a
//! [`PlayerDirectory`]. The world host implements the trait over its own
//! object model; [`Roster`] is the in-memory implementation used by the
//! engine binary and by tests.

use std::collections::{BTreeMap, BTreeSet};

use bounty_types::{GuildId, PlayerSerial, PlayerView};

/// Resolves player serials to live snapshots.
pub trait PlayerDirectory {
    /// Look up a player. Returns `None` if the serial never existed.
    fn resolve(&self, serial: PlayerSerial) -> Option<PlayerView>;

    /// Whether the two guilds are allied.
    fn are_allied(&self, a: GuildId, b: GuildId) -> bool;

    /// Look up a player that exists and has not been deleted.
    fn resolve_live(&self, serial: PlayerSerial) -> Option<PlayerView> {
        self.resolve(serial).filter(PlayerView::is_live)
    }
}

/// An in-memory player directory.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: BTreeMap<PlayerSerial, PlayerView>,
    /// Alliances stored with the smaller guild id first.
    alliances: BTreeSet<(GuildId, GuildId)>,
}

impl Roster {
    /// Create an empty roster.
    pub const fn new() -> Self {
        Self {
            players: BTreeMap::new(),
            alliances: BTreeSet::new(),
        }
    }

    /// Add or replace a player.
    pub fn insert(&mut self, player: PlayerView) {
        self.players.insert(player.serial, player);
    }

    /// Remove a player entirely, as if the serial had never existed.
    pub fn remove(&mut self, serial: PlayerSerial) -> Option<PlayerView> {
        self.players.remove(&serial)
    }

    /// Flag a player as deleted while keeping the record.
    pub fn mark_deleted(&mut self, serial: PlayerSerial) {
        if let Some(player) = self.players.get_mut(&serial) {
            player.deleted = true;
        }
    }

    /// Record an alliance between two guilds.
    pub fn ally(&mut self, a: GuildId, b: GuildId) {
        self.alliances.insert(ordered(a, b));
    }

    /// Number of players known.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl PlayerDirectory for Roster {
    fn resolve(&self, serial: PlayerSerial) -> Option<PlayerView> {
        self.players.get(&serial).cloned()
    }

    fn are_allied(&self, a: GuildId, b: GuildId) -> bool {
        self.alliances.contains(&ordered(a, b))
    }
}

const fn ordered(a: GuildId, b: GuildId) -> (GuildId, GuildId) {
    if a.0 <= b.0 { (a, b) } else { (b, a) }
}
