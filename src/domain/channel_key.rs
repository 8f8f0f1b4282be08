//! Broadcast channel key derived from a raw room name.
//!
//! [`ChannelKey`] is the dispatcher's unit of fan-out. Raw room names arrive
//! percent-decoded from the connection path and may contain arbitrary
//! characters; the key keeps only `[A-Za-z0-9_.-]` and replaces everything
//! else with `_`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized room name used to address a broadcast channel.
///
/// Derivation is pure, total, and idempotent. Two distinct raw names can
/// normalize to the same key (`"a/b"` and `"a_b"` both map to `a_b`); they
/// then share one channel. That collision is documented behavior, not an
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelKey(String);

impl ChannelKey {
    /// Derives the channel key for a raw (already percent-decoded) room name.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let key = raw
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        Self(key)
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
