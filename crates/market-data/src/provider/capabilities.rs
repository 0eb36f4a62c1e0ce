//! Provider capabilities.

use chrono::{DateTime, Duration, Utc};

/// Describes which queries a rate provider can answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderCapabilities {
    /// Whether the provider can answer "what is the rate right now".
    pub supports_latest: bool,

    /// Whether the provider can answer for a past timestamp.
    pub supports_historical: bool,

    /// How far back the provider can answer, if bounded.
    pub max_history: Option<Duration>,
}

impl ProviderCapabilities {
    /// A provider that answers for any past date.
    pub const fn full_history() -> Self {
        Self {
            supports_latest: true,
            supports_historical: true,
            max_history: None,
        }
    }

    /// A provider that only knows today's rate.
    pub const fn latest_only() -> Self {
        Self {
            supports_latest: true,
            supports_historical: false,
            max_history: None,
        }
    }

    /// Whether a historical query for `timestamp` is within reach at `now`.
    pub fn covers(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if !self.supports_historical {
            return false;
        }
        match self.max_history {
            Some(window) => now - timestamp <= window,
            None => true,
        }
    }
}
