//! Message model shared by both ends of the link
//!
//! A message is the logical unit exchanged with the peer: which command or
//! response it is (`id`) and an opaque body. The transport never looks
//! inside the body.

use core::fmt;

use heapless::Vec;

use crate::frame::{self, FrameError, MAX_FRAME_SIZE};

/// Maximum body size in bytes
pub const MAX_BODY_SIZE: usize = 64;

/// Identifies a command or response type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MessageId(pub u16);

impl MessageId {
    /// User serial data tunnelled to the peer
    pub const SERIAL_DATA: Self = Self(0x0000);
    /// HID device report forwarded to the BLE host
    pub const HID_SEND_REPORT: Self = Self(0x0C00);
    /// Peer echoes the body back unchanged
    pub const DEBUG_LOOPBACK: Self = Self(0xFE00);

    /// Raw 16-bit value
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Little-endian wire bytes `[lo, hi]`
    pub const fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }

    /// Rebuild an id from its little-endian wire bytes
    pub const fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }
}

impl From<u16> for MessageId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<MessageId> for u16 {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// A complete message: id plus body
///
/// Built by a caller for sending, or by the frame parser once a valid
/// frame has been received. Not modified after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    id: MessageId,
    body: Vec<u8, MAX_BODY_SIZE>,
}

impl Message {
    /// Create a message, rejecting bodies longer than [`MAX_BODY_SIZE`]
    pub fn new(id: MessageId, body: &[u8]) -> Result<Self, FrameError> {
        let body = Vec::from_slice(body).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { id, body })
    }

    /// Create a message with no body
    pub fn empty(id: MessageId) -> Self {
        Self {
            id,
            body: Vec::new(),
        }
    }

    pub(crate) fn from_parts(id: MessageId, body: Vec<u8, MAX_BODY_SIZE>) -> Self {
        Self { id, body }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body length as carried in the frame's length byte
    pub fn body_len(&self) -> u8 {
        // MAX_BODY_SIZE < 256, so this never truncates
        self.body.len() as u8
    }

    /// Encode this message as a frame into `buffer`
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        frame::encode(self.id, &self.body, buffer)
    }

    /// Encode this message as a frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::BufferTooSmall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_new() {
        let msg = Message::new(MessageId(0x0102), &[1, 2, 3]).unwrap();
        assert_eq!(msg.id(), MessageId(0x0102));
        assert_eq!(msg.body(), &[1, 2, 3]);
        assert_eq!(msg.body_len(), 3);
    }

    #[test]
    fn test_message_max_body() {
        let body = [0x55u8; MAX_BODY_SIZE];
        let msg = Message::new(MessageId::SERIAL_DATA, &body).unwrap();
        assert_eq!(msg.body_len() as usize, MAX_BODY_SIZE);
    }

    #[test]
    fn test_payload_too_large() {
        let body = [0u8; MAX_BODY_SIZE + 1];
        let result = Message::new(MessageId::SERIAL_DATA, &body);
        assert_eq!(result, Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_message_id_wire_order() {
        let id = MessageId(0x0C00);
        assert_eq!(id.to_le_bytes(), [0x00, 0x0C]);
        assert_eq!(MessageId::from_le_bytes([0x00, 0x0C]), id);
    }

    #[test]
    fn test_message_id_display() {
        let mut text = heapless::String::<8>::new();
        core::fmt::write(&mut text, format_args!("{}", MessageId(0x2A))).unwrap();
        assert_eq!(text.as_str(), "0x002a");
    }
}
