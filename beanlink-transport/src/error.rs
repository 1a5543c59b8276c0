//! Transport error types
//!
//! Nothing here is fatal: every error leaves the transport ready for the
//! next send or call.

use beanlink_protocol::FrameError;

/// Errors surfaced to callers of the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError<E> {
    /// No matching reply before the deadline
    Timeout,
    /// Another call/response is already in flight; nothing was sent
    Busy,
    /// Body exceeds the maximum message size
    PayloadTooLarge,
    /// Loopback reply did not echo the request body
    LoopbackMismatch,
    /// The byte sink failed
    Io(E),
}

impl<E> From<FrameError> for TransportError<E> {
    fn from(_: FrameError) -> Self {
        // Encoding into a MAX_FRAME_SIZE buffer can only fail on body size
        TransportError::PayloadTooLarge
    }
}

impl<E> From<CallInProgress> for TransportError<E> {
    fn from(_: CallInProgress) -> Self {
        TransportError::Busy
    }
}

/// A pending call is already registered with the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CallInProgress;
