//! Roster file loading for the standalone host.
//!
//! A world server implements [`PlayerDirectory`] over its own object model.
//! The standalone host has no world, so it reads players, their banked
//! gold, and guild alliances from a YAML file instead.
//!
//! [`PlayerDirectory`]: bounty_ledger::PlayerDirectory

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::path::Path;

use serde::Deserialize;

use bounty_ledger::Roster;
use bounty_types::{GuildId, PlayerSerial, PlayerView};

use crate::config::ConfigError;
use crate::treasury::Bank;

/// Players and balances read from a roster file.
#[derive(Debug, Clone, Default)]
pub struct StandaloneWorld {
    /// Player directory.
    pub roster: Roster,
    /// Banked gold, one account per player.
    pub bank: Bank,
}

/// Top level of the roster file.
#[derive(Debug, Clone, Default, Deserialize)]
struct RosterFile {
    #[serde(default)]
    players: Vec<PlayerEntry>,
    #[serde(default)]
    alliances: Vec<(GuildId, GuildId)>,
}

/// One player in the roster file.
#[derive(Debug, Clone, Deserialize)]
struct PlayerEntry {
    serial: PlayerSerial,
    name: String,
    #[serde(default)]
    guild: Option<GuildId>,
    #[serde(default)]
    account: Option<String>,
    #[serde(default)]
    login_ips: BTreeSet<IpAddr>,
    #[serde(default)]
    online: bool,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    staff: bool,
    #[serde(default)]
    gold: u64,
}

impl From<PlayerEntry> for PlayerView {
    fn from(entry: PlayerEntry) -> Self {
        Self {
            // One account per character unless the file says otherwise.
            account: entry
                .account
                .unwrap_or_else(|| format!("account-{}", entry.serial.into_inner())),
            serial: entry.serial,
            name: entry.name,
            guild: entry.guild,
            login_ips: entry.login_ips,
            online: entry.online,
            deleted: entry.deleted,
            is_staff: entry.staff,
        }
    }
}

/// Load a roster from a YAML file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, or
/// [`ConfigError::Yaml`] if it is not a valid roster.
pub fn load_roster(path: &Path) -> Result<StandaloneWorld, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    parse_roster(&contents)
}

/// Parse a roster from a YAML string.
///
/// # Errors
///
/// Returns [`ConfigError::Yaml`] if the string is not a valid roster.
pub fn parse_roster(yaml: &str) -> Result<StandaloneWorld, ConfigError> {
    let file: RosterFile = if yaml.trim().is_empty() {
        RosterFile::default()
    } else {
        serde_yml::from_str(yaml)?
    };

    let mut world = StandaloneWorld::default();
    for entry in file.players {
        world.bank.open(entry.serial, entry.gold);
        world.roster.insert(entry.into());
    }
    for (a, b) in file.alliances {
        world.roster.ally(a, b);
    }

    tracing::debug!(players = world.roster.len(), "Roster parsed");
    Ok(world)
}

#[cfg(test)]
mod tests {
    use bounty_ledger::PlayerDirectory;

    use super::*;

    const YAML: &str = r#"
players:
  - serial: 256
    name: "Rowan"
    gold: 2500
    guild: 1
    login_ips: ["10.0.0.5"]
    online: true
  - serial: 512
    name: "Black Maud"
    guild: 2
    account: "maud"
  - serial: 768
    name: "Seer"
    staff: true

alliances:
  - [1, 2]
"#;

    #[test]
    fn players_and_alliances_are_loaded() {
        let world = parse_roster(YAML).ok().unwrap_or_default();
        let roster = &world.roster;
        assert_eq!(roster.len(), 3);
        assert_eq!(world.bank.balance(PlayerSerial(256)), Some(2_500));
        assert_eq!(world.bank.balance(PlayerSerial(512)), Some(0));

        let rowan = roster.resolve(PlayerSerial(256));
        assert_eq!(rowan.as_ref().map(|p| p.account.as_str()), Some("account-256"));
        assert_eq!(rowan.map(|p| p.login_ips.len()), Some(1));

        assert_eq!(
            roster.resolve(PlayerSerial(512)).map(|p| p.account),
            Some("maud".to_owned())
        );
        assert_eq!(roster.resolve(PlayerSerial(768)).map(|p| p.is_staff), Some(true));
        assert!(roster.are_allied(GuildId(2), GuildId(1)));
    }

    #[test]
    fn empty_roster_is_valid() {
        assert!(parse_roster("").ok().is_some_and(|w| w.roster.is_empty()));
    }

    #[test]
    fn bad_address_is_an_error() {
        let yaml = "players:\n  - serial: 1\n    name: x\n    login_ips: [\"not-an-ip\"]\n";
        assert!(matches!(parse_roster(yaml), Err(ConfigError::Yaml { .. })));
    }
}
