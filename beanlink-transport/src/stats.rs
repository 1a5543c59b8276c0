//! Link diagnostics counters
//!
//! Updated from both the receive context and caller tasks, so every counter
//! is a relaxed atomic. Values wrap on overflow.

use portable_atomic::{AtomicU32, Ordering};

/// Live counters owned by the dispatcher
#[derive(Debug)]
pub struct LinkStats {
    framing_errors: AtomicU32,
    messages_received: AtomicU32,
    queue_overflows: AtomicU32,
    replies_delivered: AtomicU32,
    timeouts: AtomicU32,
    frames_sent: AtomicU32,
}

/// Point-in-time copy of [`LinkStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStatsSnapshot {
    /// Frames discarded by the parser
    pub framing_errors: u32,
    /// Valid messages decoded (replies and unsolicited)
    pub messages_received: u32,
    /// Unmatched messages dropped because the inbound queue was full
    pub queue_overflows: u32,
    /// Messages that fulfilled a pending call
    pub replies_delivered: u32,
    /// Calls that hit their deadline
    pub timeouts: u32,
    /// Frames handed to the byte sink
    pub frames_sent: u32,
}

impl LinkStats {
    pub const fn new() -> Self {
        Self {
            framing_errors: AtomicU32::new(0),
            messages_received: AtomicU32::new(0),
            queue_overflows: AtomicU32::new(0),
            replies_delivered: AtomicU32::new(0),
            timeouts: AtomicU32::new(0),
            frames_sent: AtomicU32::new(0),
        }
    }

    pub(crate) fn record_framing_error(&self) {
        self.framing_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_queue_overflow(&self) {
        self.queue_overflows.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_reply_delivered(&self) {
        self.replies_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_frame_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy all counters
    pub fn snapshot(&self) -> LinkStatsSnapshot {
        LinkStatsSnapshot {
            framing_errors: self.framing_errors.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            queue_overflows: self.queue_overflows.load(Ordering::Relaxed),
            replies_delivered: self.replies_delivered.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
        }
    }
}

impl Default for LinkStats {
    fn default() -> Self {
        Self::new()
    }
}
