//! Transport configuration
//!
//! Everything here is fixed when the transport is constructed. The inbound
//! queue capacity is the dispatcher's const generic rather than a field so
//! its storage can live in a `static`.

use embassy_time::Duration;

use beanlink_protocol::MessageId;

/// Minimum spacing between outbound frames, giving the peer time to wake
/// and drain its receive buffer
pub const DEFAULT_MIN_SEND_SPACING_MS: u32 = 13;

/// Timeout used by [`crate::Transport::call`]
pub const DEFAULT_CALL_TIMEOUT_MS: u32 = 100;

/// Inbound queue capacity most boards use
pub const DEFAULT_INBOUND_CAPACITY: usize = 8;

/// How the peer derives a response id from the request id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResponseIdRule {
    /// Response carries the request id unchanged
    #[default]
    Same,
    /// Response id is the request id plus a fixed offset (wrapping)
    Offset(u16),
    /// Response id is the request id with these bits set
    Flag(u16),
}

impl ResponseIdRule {
    /// Id the peer will answer `request` with
    pub const fn response_for(self, request: MessageId) -> MessageId {
        match self {
            ResponseIdRule::Same => request,
            ResponseIdRule::Offset(offset) => MessageId(request.0.wrapping_add(offset)),
            ResponseIdRule::Flag(bits) => MessageId(request.0 | bits),
        }
    }
}

/// Transport settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportConfig {
    /// Minimum time between the starts of two consecutive sends (ms)
    pub min_send_spacing_ms: u32,
    /// Timeout for [`crate::Transport::call`] (ms)
    pub default_timeout_ms: u32,
    /// Response id derivation used by call/response
    pub response_id: ResponseIdRule,
}

impl TransportConfig {
    /// Default configuration
    pub const fn new() -> Self {
        Self {
            min_send_spacing_ms: DEFAULT_MIN_SEND_SPACING_MS,
            default_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            response_id: ResponseIdRule::Same,
        }
    }

    pub const fn with_min_send_spacing_ms(mut self, ms: u32) -> Self {
        self.min_send_spacing_ms = ms;
        self
    }

    pub const fn with_default_timeout_ms(mut self, ms: u32) -> Self {
        self.default_timeout_ms = ms;
        self
    }

    pub const fn with_response_id(mut self, rule: ResponseIdRule) -> Self {
        self.response_id = rule;
        self
    }

    pub fn min_send_spacing(&self) -> Duration {
        Duration::from_millis(u64::from(self.min_send_spacing_ms))
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.default_timeout_ms))
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new()
    }
}
