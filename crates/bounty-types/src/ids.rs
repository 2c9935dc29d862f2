//! Type-safe identifier wrappers around host-issued integers.
//!
//! The world host hands out numeric serials for players and guilds, and the
//! announcement system hands out numeric handles for public notices. Each
//! gets its own newtype so a guild id can never be passed where a player
//! serial is expected.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around an integer with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty)
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Return the inner integer value.
            pub const fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{:#x}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(id: $inner) -> Self {
                Self(id)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Serial of a player character in the world host.
    PlayerSerial(u32)
}

define_id! {
    /// Identifier of a guild in the world host.
    GuildId(u32)
}

define_id! {
    /// Correlation handle of a public notice in the announcement system.
    ///
    /// A raw value of zero means "no notice"; the ledger models that as
    /// `Option::None` and never stores a zero handle.
    MessageHandle(u64)
}

impl MessageHandle {
    /// Wrap a raw handle, mapping zero to `None`.
    pub const fn from_raw(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serials_display_as_hex() {
        assert_eq!(PlayerSerial(0x1a2b).to_string(), "0x1a2b");
    }

    #[test]
    fn zero_message_handle_is_none() {
        assert_eq!(MessageHandle::from_raw(0), None);
        assert_eq!(MessageHandle::from_raw(7), Some(MessageHandle(7)));
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&PlayerSerial(42)).ok();
        assert_eq!(json.as_deref(), Some("42"));
    }
}
