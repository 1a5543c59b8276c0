//! Beanlink HID
//!
//! Keyboard, mouse and consumer control input reports for the peer's
//! HID-over-radio function. Each caller keeps its own report state and
//! sends the whole report on every change as a fire-and-forget
//! [`MessageId::HID_SEND_REPORT`](beanlink_transport::MessageId::HID_SEND_REPORT)
//! message.
//!
//! The callers are generic over [`MessageSender`], so they work over a
//! [`beanlink_transport::Transport`] or anything else that can send.
//!
//! ```ignore
//! let mut keyboard = Keyboard::new(&transport);
//! keyboard.write_str("hello\n").await?;
//!
//! let mut mouse = Mouse::new(&transport);
//! mouse.click(MOUSE_LEFT).await?;
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod consumer;
pub mod keyboard;
pub mod keycodes;
pub mod mouse;
pub mod report;

pub use beanlink_transport::MessageSender;
pub use consumer::{ConsumerCommand, ConsumerControl, ConsumerReport};
pub use keyboard::{KeyReport, Keyboard};
pub use mouse::{Mouse, MOUSE_ALL, MOUSE_LEFT, MOUSE_MIDDLE, MOUSE_RIGHT};
pub use report::{HidError, HidReport, ReportId};
