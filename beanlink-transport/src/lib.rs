//! Beanlink Transport
//!
//! Reliable, addressable request/response exchanges with the peer radio
//! controller over a raw serial link.
//!
//! # Architecture
//!
//! ```text
//!  caller tasks                               UART RX interrupt
//!       │                                            │
//!       ▼                                            ▼
//! ┌───────────┐  encode   ┌──────────┐     ┌──────────────────┐
//! │ Transport │ ────────► │ ByteSink │     │ ReceiveAssembler │
//! └───────────┘           └──────────┘     └──────────────────┘
//!       │ register / wait                            │ submit_completed
//!       ▼                                            ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │ Dispatcher: pending-call slot · reply signal · inbound queue│
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The receive context owns the [`ReceiveAssembler`] outright. Caller tasks
//! share a `&Transport`. The [`Dispatcher`] is the only state the two
//! sides have in common, and it never makes the receive side wait.
//!
//! # Example
//!
//! ```ignore
//! static DISPATCHER: Dispatcher<CriticalSectionRawMutex, DEFAULT_INBOUND_CAPACITY> =
//!     Dispatcher::new();
//!
//! // RX interrupt
//! assembler.on_byte_received(byte);
//!
//! // Task
//! let transport = Transport::new(uart_tx, &DISPATCHER, TransportConfig::default());
//! let reply = transport.call(MessageId(0x0510), &[]).await?;
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This must go first so the macros are visible to the other modules
mod fmt;

pub mod assembler;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod stats;
pub mod transport;

pub use assembler::ReceiveAssembler;
pub use config::{
    ResponseIdRule, TransportConfig, DEFAULT_CALL_TIMEOUT_MS, DEFAULT_INBOUND_CAPACITY,
    DEFAULT_MIN_SEND_SPACING_MS,
};
pub use dispatch::{Dispatcher, PendingCall, PendingState};
pub use error::{CallInProgress, TransportError};
pub use stats::{LinkStats, LinkStatsSnapshot};
pub use transport::{MessageSender, Transport};

// Re-export the protocol types every caller needs
pub use beanlink_protocol::{FrameError, Message, MessageId, MAX_BODY_SIZE};
