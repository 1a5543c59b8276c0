//! Beanlink Hardware Abstraction Layer
//!
//! This crate defines the serial capability the transport is generic over.
//! A board support crate implements these traits for its UART (or USB CDC)
//! peripheral and hands the implementation to the transport; the transport
//! never touches registers or interrupt vectors itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  beanlink-transport / beanlink-hid      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  beanlink-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ board UART    │       │ test doubles  │
//! │ adapter       │       │ (host)        │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`serial::ByteSink`] - Outbound bytes (UART TX)
//! - [`serial::ByteSource`] - Polled inbound bytes (UART RX)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod serial;

// Re-export key traits at crate root for convenience
pub use serial::{ByteSink, ByteSource, IoSink};
