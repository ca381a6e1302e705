//! # Negotiation Configuration

use marketplace_types::Cents;
use serde::{Deserialize, Serialize};

/// Seven days, the default response window for a pending offer.
pub const DEFAULT_EXPIRY_SECS: u64 = 7 * 24 * 3600;

/// Platform-wide offer floor: 1000 minor units.
pub const DEFAULT_PLATFORM_MINIMUM_CENTS: Cents = 1000;

/// Engine configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NegotiationConfig {
    /// No offer anywhere on the platform may go below this, in cents.
    pub platform_minimum_cents: Cents,
    /// How long a freshly created node stays answerable.
    pub offer_expiry_secs: u64,
    /// Maximum length of the optional message attached to an offer.
    pub max_message_chars: usize,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            platform_minimum_cents: DEFAULT_PLATFORM_MINIMUM_CENTS,
            offer_expiry_secs: DEFAULT_EXPIRY_SECS,
            max_message_chars: 1000,
        }
    }
}

impl NegotiationConfig {
    /// Validate the configuration.
    ///
    /// A zero floor would let offers of nothing through, and a zero window
    /// would make every offer expire the moment it is created.
    pub fn validate(&self) -> Result<(), String> {
        if self.platform_minimum_cents == 0 {
            return Err("platform_minimum_cents must be positive".to_string());
        }
        if self.offer_expiry_secs == 0 {
            return Err("offer_expiry_secs must be positive".to_string());
        }
        if self.max_message_chars == 0 {
            return Err("max_message_chars must be positive".to_string());
        }
        Ok(())
    }
}
