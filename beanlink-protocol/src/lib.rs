//! Beanlink Serial Protocol
//!
//! This crate defines the wire protocol between the application MCU and the
//! peer radio controller. Every exchange is a [`Message`]: a 16-bit id, a
//! length and a short body. On the wire each message travels as one
//! self-delimiting, byte-stuffed frame:
//!
//! ```text
//! ┌───────┬───────┬───────┬────────┬─────────────┬──────────┬─────┐
//! │ START │ ID_LO │ ID_HI │ LENGTH │ BODY        │ CHECKSUM │ END │
//! │ 0x7E  │ 1B    │ 1B    │ 1B     │ 0–64B       │ 1B       │ 0x7F│
//! └───────┴───────┴───────┴────────┴─────────────┴──────────┴─────┘
//! ```
//!
//! Any interior byte equal to START, END or ESCAPE is sent as
//! `ESCAPE, byte ^ 0x20`, so the markers never appear inside a frame and a
//! receiver can always resynchronise on the next START.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod message;

pub use frame::{
    FrameError, FrameParser, FRAME_END, FRAME_ESCAPE, FRAME_START, MAX_FRAME_SIZE,
};
pub use message::{Message, MessageId, MAX_BODY_SIZE};
