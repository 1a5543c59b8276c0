//! HID device report envelope
//!
//! Every HID report travels to the peer as the body of a
//! [`MessageId::HID_SEND_REPORT`] message:
//!
//! ```text
//! ┌────┬──────┬─────┬──────────────────┐
//! │ id │ type │ len │ data[8]          │
//! └────┴──────┴─────┴──────────────────┘
//! ```
//!
//! `data` is always 8 bytes on the wire; only the first `len` carry the
//! report, the rest are zero.

use beanlink_transport::{MessageId, MessageSender};

/// Size of the data area in the envelope
pub const REPORT_DATA_LEN: usize = 8;

/// Size of the whole envelope (message body)
pub const REPORT_ENVELOPE_LEN: usize = 3 + REPORT_DATA_LEN;

/// Input report type in the envelope's `type` byte
pub const REPORT_TYPE_INPUT: u8 = 1;

/// Report ids from the peer's HID report descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ReportId {
    Mouse = 1,
    Keyboard = 2,
    ConsumerControl = 3,
}

impl ReportId {
    /// Length of the input report with this id
    pub const fn data_len(self) -> usize {
        match self {
            ReportId::Mouse => 4,
            ReportId::Keyboard => 8,
            ReportId::ConsumerControl => 2,
        }
    }
}

/// Errors from the HID callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidError<E> {
    /// Character has no scancode in the ASCII map
    UnmappedKey,
    /// All six key slots are in use
    ReportFull,
    /// The transport rejected the report
    Send(E),
}

/// One input report ready to be sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HidReport {
    id: ReportId,
    data: [u8; REPORT_DATA_LEN],
}

impl HidReport {
    pub fn mouse(data: [u8; 4]) -> Self {
        Self::from_slice(ReportId::Mouse, &data)
    }

    pub fn keyboard(data: [u8; 8]) -> Self {
        Self::from_slice(ReportId::Keyboard, &data)
    }

    pub fn consumer_control(data: [u8; 2]) -> Self {
        Self::from_slice(ReportId::ConsumerControl, &data)
    }

    fn from_slice(id: ReportId, report: &[u8]) -> Self {
        let mut data = [0u8; REPORT_DATA_LEN];
        data[..report.len()].copy_from_slice(report);
        Self { id, data }
    }

    pub fn id(&self) -> ReportId {
        self.id
    }

    /// The meaningful part of the data area
    pub fn data(&self) -> &[u8] {
        &self.data[..self.id.data_len()]
    }

    /// Envelope bytes, as sent in the message body
    pub fn to_bytes(&self) -> [u8; REPORT_ENVELOPE_LEN] {
        let mut out = [0u8; REPORT_ENVELOPE_LEN];
        out[0] = self.id as u8;
        out[1] = REPORT_TYPE_INPUT;
        out[2] = self.id.data_len() as u8;
        out[3..].copy_from_slice(&self.data);
        out
    }

    /// Hand the report to the transport, fire-and-forget
    pub async fn send<T: MessageSender>(&self, sender: &T) -> Result<(), HidError<T::Error>> {
        sender
            .send_message(MessageId::HID_SEND_REPORT, &self.to_bytes())
            .await
            .map(|_| ())
            .map_err(HidError::Send)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use beanlink_transport::{MessageId, MessageSender};
    use core::cell::{Cell, RefCell};
    use std::vec::Vec;

    /// Sender that records every message body
    #[derive(Default)]
    pub struct RecordingSender {
        pub sent: RefCell<Vec<(MessageId, Vec<u8>)>>,
        pub fail: bool,
        /// Zero-based index of the one send that fails
        pub fail_at: Option<usize>,
        calls: Cell<usize>,
    }

    impl RecordingSender {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn failing_at(call: usize) -> Self {
            Self {
                fail_at: Some(call),
                ..Self::default()
            }
        }

        /// Data area of every report sent so far
        pub fn reports(&self) -> Vec<Vec<u8>> {
            self.sent
                .borrow()
                .iter()
                .map(|(_, body)| body[3..3 + body[2] as usize].to_vec())
                .collect()
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LinkDown;

    impl MessageSender for RecordingSender {
        type Error = LinkDown;

        async fn send_message(&self, id: MessageId, body: &[u8]) -> Result<usize, Self::Error> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            if self.fail || self.fail_at == Some(call) {
                return Err(LinkDown);
            }
            self.sent.borrow_mut().push((id, body.to_vec()));
            Ok(body.len())
        }
    }
}
