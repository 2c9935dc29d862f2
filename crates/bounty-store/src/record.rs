//! The persisted record format.
//!
//! One JSON document per line. The first line is the root record, every
//! following line is one posting:
//!
//! ```text
//! {"count":2,"bonus_fund":1350}
//! {"wanted":"512","placer":"768","posted_at":"2025-06-01T00:00:00Z","reward":"1000","bonus_eligible":"true"}
//! {"wanted":"512","placer":"1024","posted_at":"2025-06-02T00:00:00Z","reward":"200","bonus_eligible":"false","placer_name":"The Crown","message_handle":"17"}
//! ```
//!
//! Posting fields are strings so that hand-edited and legacy records load
//! the same way. `count` is informational only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bounty_ledger::PostingBuilder;
use bounty_types::{Bounty, MessageHandle, PlayerSerial};

use crate::timestamp::{format_timestamp, parse_timestamp};

/// First line of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootRecord {
    /// Number of posting lines written. Not checked on load.
    #[serde(default)]
    pub count: u64,
    /// Bonus pool balance.
    #[serde(default)]
    pub bonus_fund: u64,
}

/// One posting line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingRecord {
    /// Serial of the wanted player.
    pub wanted: String,
    /// Serial of the placer.
    pub placer: String,
    /// Posting time.
    pub posted_at: String,
    /// Pledged gold.
    pub reward: String,
    /// `"true"` or `"false"`. Absent means `"true"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_eligible: Option<String>,
    /// Placer display name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placer_name: Option<String>,
    /// Notice handle. Omitted when zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_handle: Option<String>,
}

impl PostingRecord {
    /// Build the record line for a posting.
    pub fn from_bounty(bounty: &Bounty) -> Self {
        Self {
            wanted: bounty.wanted.into_inner().to_string(),
            placer: bounty.placer.into_inner().to_string(),
            posted_at: format_timestamp(bounty.posted_at),
            reward: bounty.reward.to_string(),
            bonus_eligible: Some(bounty.bonus_eligible.to_string()),
            placer_name: bounty.placer_name_override.clone(),
            message_handle: bounty.message_handle.map(|h| h.into_inner().to_string()),
        }
    }

    /// Turn the record back into a posting.
    ///
    /// `default_time` is used when the timestamp cannot be parsed.
    pub fn to_bounty(&self, default_time: DateTime<Utc>) -> Result<Bounty, String> {
        let wanted = parse_serial(&self.wanted).ok_or_else(|| {
            format!("wanted serial {:?} is not a number", self.wanted)
        })?;
        let placer = parse_serial(&self.placer).ok_or_else(|| {
            format!("placer serial {:?} is not a number", self.placer)
        })?;
        let reward = self
            .reward
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("reward {:?}: {e}", self.reward))?;
        let bonus_eligible = self
            .bonus_eligible
            .as_deref()
            .is_none_or(|flag| !flag.trim().eq_ignore_ascii_case("false"));
        let message_handle = self
            .message_handle
            .as_deref()
            .and_then(parse_handle)
            .and_then(MessageHandle::from_raw);

        PostingBuilder::new(wanted)
            .placer(placer)
            .reward(reward)
            .bonus_eligible(bonus_eligible)
            .placer_name_override(self.placer_name.clone())
            .message_handle(message_handle)
            .posted_at(parse_timestamp(&self.posted_at, default_time))
            .build()
            .map_err(|e| e.to_string())
    }
}

/// Decimal or `0x`-prefixed hexadecimal serial.
fn parse_serial(raw: &str) -> Option<PlayerSerial> {
    let raw = raw.trim();
    let value = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => raw.parse::<u32>().ok()?,
    };
    Some(PlayerSerial(value))
}

/// Integer text, or floating-point text written by older builds.
fn parse_handle(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.parse::<u64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(handle_from_float))
}

/// 2^64, the first float above `u64::MAX`.
const U64_CEILING: f64 = 18_446_744_073_709_551_616.0;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn handle_from_float(value: f64) -> Option<u64> {
    // Range checked first, so the cast cannot wrap.
    (value.is_finite() && value >= 0.0 && value < U64_CEILING).then(|| value.trunc() as u64)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn default_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn record() -> PostingRecord {
        PostingRecord {
            wanted: "512".to_owned(),
            placer: "768".to_owned(),
            posted_at: "2025-06-01T00:00:00Z".to_owned(),
            reward: "1000".to_owned(),
            bonus_eligible: None,
            placer_name: None,
            message_handle: None,
        }
    }

    #[test]
    fn absent_bonus_flag_defaults_to_true() {
        let bounty = record().to_bounty(default_time());
        assert_eq!(bounty.map(|b| b.bonus_eligible), Ok(true));
    }

    #[test]
    fn explicit_false_flag_is_respected() {
        let mut r = record();
        r.bonus_eligible = Some("False".to_owned());
        assert_eq!(r.to_bounty(default_time()).map(|b| b.bonus_eligible), Ok(false));
    }

    #[test]
    fn optional_fields_are_omitted_when_unset() {
        let bounty = record().to_bounty(default_time());
        let line = bounty
            .as_ref()
            .ok()
            .map(PostingRecord::from_bounty)
            .and_then(|r| serde_json::to_string(&r).ok())
            .unwrap_or_default();
        assert!(!line.contains("placer_name"));
        assert!(!line.contains("message_handle"));
        assert!(line.contains(r#""bonus_eligible":"true""#));
    }

    #[test]
    fn float_handles_from_older_builds_are_read() {
        let mut r = record();
        r.message_handle = Some("17.0".to_owned());
        assert_eq!(
            r.to_bounty(default_time()).map(|b| b.message_handle),
            Ok(Some(MessageHandle(17)))
        );

        r.message_handle = Some("0".to_owned());
        assert_eq!(r.to_bounty(default_time()).map(|b| b.message_handle), Ok(None));

        r.message_handle = Some("-4.5".to_owned());
        assert_eq!(r.to_bounty(default_time()).map(|b| b.message_handle), Ok(None));
    }

    #[test]
    fn hex_serials_are_accepted() {
        let mut r = record();
        r.wanted = "0x200".to_owned();
        assert_eq!(
            r.to_bounty(default_time()).map(|b| b.wanted),
            Ok(PlayerSerial(512))
        );
    }

    #[test]
    fn bad_reward_is_an_error() {
        let mut r = record();
        r.reward = "lots".to_owned();
        assert!(r.to_bounty(default_time()).is_err());
    }

    #[test]
    fn bad_timestamp_uses_default() {
        let mut r = record();
        r.posted_at = "???".to_owned();
        assert_eq!(r.to_bounty(default_time()).map(|b| b.posted_at), Ok(default_time()));
    }
}
