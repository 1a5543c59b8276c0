//! Reply correlation and inbound queue
//!
//! The dispatcher is the only state shared between the receive context and
//! caller tasks:
//!
//! - the pending-call slot, behind a blocking mutex that is held for a few
//!   instructions and never across an `.await`,
//! - a [`Signal`] carrying the reply to the waiting caller,
//! - a bounded [`Channel`] for every message nobody is waiting for.
//!
//! A message arriving from the receive context either fulfils the pending
//! call or is queued; it is never both.

use core::cell::Cell;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::channel::{Channel, TrySendError};
use embassy_sync::signal::Signal;
use embassy_time::{Instant, TimeoutError, Timer};

use beanlink_protocol::{Message, MessageId};

use crate::error::CallInProgress;
use crate::stats::{LinkStats, LinkStatsSnapshot};

/// Lifecycle of a pending call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PendingState {
    /// Registered, no matching reply yet
    Waiting,
    /// A matching reply was handed over
    Fulfilled,
    /// Deadline passed first
    TimedOut,
}

#[derive(Debug, Clone, Copy)]
struct PendingSlot {
    expected_id: MessageId,
    state: PendingState,
}

/// Routes completed messages to a waiting caller or the inbound queue
///
/// `N` is the inbound queue capacity. All constructors are `const` so a
/// board can keep the dispatcher in a `static`.
pub struct Dispatcher<M: RawMutex, const N: usize> {
    pending: BlockingMutex<M, Cell<Option<PendingSlot>>>,
    reply: Signal<M, Message>,
    inbound: Channel<M, Message, N>,
    stats: LinkStats,
}

impl<M: RawMutex, const N: usize> Default for Dispatcher<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> Dispatcher<M, N> {
    pub const fn new() -> Self {
        Self {
            pending: BlockingMutex::new(Cell::new(None)),
            reply: Signal::new(),
            inbound: Channel::new(),
            stats: LinkStats::new(),
        }
    }

    /// Hand over a message decoded by the receive assembler
    ///
    /// Safe to call from an interrupt: takes only the short pending-slot
    /// critical section and never waits. If the inbound queue is full the
    /// message is dropped and counted.
    pub fn submit_completed(&self, message: Message) {
        self.stats.record_message_received();

        let unclaimed = self.pending.lock(|slot| match slot.get() {
            Some(pending)
                if pending.state == PendingState::Waiting
                    && pending.expected_id == message.id() =>
            {
                slot.set(Some(PendingSlot {
                    state: PendingState::Fulfilled,
                    ..pending
                }));
                // Signalled inside the section so a concurrent cancel
                // cannot interleave between the state change and the value
                self.reply.signal(message);
                None
            }
            _ => Some(message),
        });

        let Some(message) = unclaimed else {
            self.stats.record_reply_delivered();
            return;
        };

        let id = message.id();
        match self.inbound.try_send(message) {
            Ok(()) => trace!("Queued message {}", id),
            Err(TrySendError::Full(dropped)) => {
                self.stats.record_queue_overflow();
                warn!("Inbound queue full, dropping message {}", dropped.id());
            }
        }
    }

    /// Route the next message with `expected_id` to the returned call
    ///
    /// Only messages completed after this point can fulfil the call; anything
    /// already sitting in the inbound queue stays there. Fails if a call is
    /// already registered.
    pub fn register(
        &self,
        expected_id: MessageId,
        deadline: Instant,
    ) -> Result<PendingCall<'_, M, N>, CallInProgress> {
        self.pending.lock(|slot| {
            if slot.get().is_some() {
                return Err(CallInProgress);
            }
            slot.set(Some(PendingSlot {
                expected_id,
                state: PendingState::Waiting,
            }));
            // Drop anything a previous call left behind
            self.reply.reset();
            Ok(())
        })?;

        Ok(PendingCall {
            dispatcher: self,
            expected_id,
            deadline,
        })
    }

    /// True while a call is registered (waiting or not yet returned)
    pub fn has_pending_call(&self) -> bool {
        self.pending.lock(|slot| slot.get().is_some())
    }

    /// Take the oldest unclaimed message, if any
    pub fn try_receive(&self) -> Option<Message> {
        self.inbound.try_receive().ok()
    }

    /// Wait for the next unclaimed message
    pub async fn receive(&self) -> Message {
        self.inbound.receive().await
    }

    /// Number of messages waiting in the inbound queue
    pub fn inbound_len(&self) -> usize {
        self.inbound.len()
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    pub fn stats_snapshot(&self) -> LinkStatsSnapshot {
        self.stats.snapshot()
    }

    fn set_state(&self, state: PendingState) {
        self.pending.lock(|slot| {
            if let Some(pending) = slot.get() {
                slot.set(Some(PendingSlot { state, ..pending }));
            }
        });
    }

    fn state(&self) -> Option<PendingState> {
        self.pending.lock(|slot| slot.get().map(|pending| pending.state))
    }

    fn clear(&self) {
        self.pending.lock(|slot| {
            slot.set(None);
            // A reply that raced the timeout must not leak into the next call
            self.reply.reset();
        });
    }
}

/// Bookkeeping for one in-flight call/response exchange
///
/// Dropping it, whether the call finished, timed out or the awaiting future
/// was abandoned, frees the dispatcher for the next call.
pub struct PendingCall<'d, M: RawMutex, const N: usize> {
    dispatcher: &'d Dispatcher<M, N>,
    expected_id: MessageId,
    deadline: Instant,
}

impl<'d, M: RawMutex, const N: usize> PendingCall<'d, M, N> {
    pub fn expected_id(&self) -> MessageId {
        self.expected_id
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn state(&self) -> PendingState {
        // The slot belongs to this call until drop
        self.dispatcher.state().unwrap_or(PendingState::TimedOut)
    }

    /// Wait for the matching reply or the deadline, whichever comes first
    pub async fn wait(&mut self) -> Result<Message, TimeoutError> {
        match select(self.dispatcher.reply.wait(), Timer::at(self.deadline)).await {
            Either::First(reply) => Ok(reply),
            Either::Second(()) => {
                // The reply may have landed in the same instant the timer fired
                if self.state() == PendingState::Fulfilled {
                    if let Some(reply) = self.dispatcher.reply.try_take() {
                        return Ok(reply);
                    }
                }
                self.dispatcher.set_state(PendingState::TimedOut);
                self.dispatcher.stats.record_timeout();
                Err(TimeoutError)
            }
        }
    }
}

impl<M: RawMutex, const N: usize> Drop for PendingCall<'_, M, N> {
    fn drop(&mut self) {
        self.dispatcher.clear();
    }
}
