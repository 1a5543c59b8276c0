//! Frame encoding and decoding for the beanlink serial protocol.
//!
//! Frame format (before byte stuffing):
//! - START (1 byte): 0x7E, never escaped
//! - ID (2 bytes): message id, little-endian
//! - LENGTH (1 byte): body length (0-64)
//! - BODY (0-64 bytes): opaque message data
//! - CHECKSUM (1 byte): XOR of ID, LENGTH and all BODY bytes
//! - END (1 byte): 0x7F, never escaped
//!
//! Every byte between START and END that equals START, END or ESCAPE is
//! replaced by `ESCAPE, byte ^ ESCAPE_MASK`.

use heapless::Vec;

use crate::message::{Message, MessageId, MAX_BODY_SIZE};

/// Frame start marker
pub const FRAME_START: u8 = 0x7E;

/// Frame end marker
pub const FRAME_END: u8 = 0x7F;

/// Escape prefix for reserved bytes inside a frame
pub const FRAME_ESCAPE: u8 = 0x7D;

/// Value XORed into an escaped byte
pub const ESCAPE_MASK: u8 = 0x20;

/// Unescaped bytes between the markers: ID (2) + LENGTH + BODY + CHECKSUM
const MAX_INNER_SIZE: usize = 2 + 1 + MAX_BODY_SIZE + 1;

/// Maximum encoded frame size (both markers plus every inner byte escaped)
pub const MAX_FRAME_SIZE: usize = 2 + 2 * MAX_INNER_SIZE;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Body exceeds maximum allowed size
    PayloadTooLarge,
    /// START arrived before the previous frame ended; a new frame was begun
    Interrupted,
    /// ESCAPE followed by a byte that does not decode to a reserved value
    InvalidEscape,
    /// Frame grew past the maximum size without an END marker
    Overflow,
    /// END arrived before ID, LENGTH and CHECKSUM were all present
    Truncated,
    /// LENGTH byte disagrees with the number of body bytes received
    LengthMismatch,
    /// Checksum mismatch
    InvalidChecksum,
}

#[inline]
fn is_reserved(byte: u8) -> bool {
    matches!(byte, FRAME_START | FRAME_END | FRAME_ESCAPE)
}

/// Calculate checksum over ID, LENGTH and BODY bytes
fn calculate_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, &byte| acc ^ byte)
}

/// Byte-stuffing writer over a caller-provided buffer
struct StuffedWriter<'a> {
    buffer: &'a mut [u8],
    pos: usize,
}

impl<'a> StuffedWriter<'a> {
    fn raw(&mut self, byte: u8) -> Result<(), FrameError> {
        let slot = self
            .buffer
            .get_mut(self.pos)
            .ok_or(FrameError::BufferTooSmall)?;
        *slot = byte;
        self.pos += 1;
        Ok(())
    }

    fn escaped(&mut self, byte: u8) -> Result<(), FrameError> {
        if is_reserved(byte) {
            self.raw(FRAME_ESCAPE)?;
            self.raw(byte ^ ESCAPE_MASK)
        } else {
            self.raw(byte)
        }
    }
}

/// Encode one message into `buffer` as a complete frame
///
/// Returns the number of bytes written. The output depends only on the
/// inputs; nothing outside `buffer` is touched.
pub fn encode(id: MessageId, body: &[u8], buffer: &mut [u8]) -> Result<usize, FrameError> {
    if body.len() > MAX_BODY_SIZE {
        return Err(FrameError::PayloadTooLarge);
    }

    let [id_lo, id_hi] = id.to_le_bytes();
    let length = body.len() as u8;
    let checksum = calculate_checksum(&[id_lo, id_hi, length]) ^ calculate_checksum(body);

    let mut out = StuffedWriter { buffer, pos: 0 };
    out.raw(FRAME_START)?;
    out.escaped(id_lo)?;
    out.escaped(id_hi)?;
    out.escaped(length)?;
    for &byte in body {
        out.escaped(byte)?;
    }
    out.escaped(checksum)?;
    out.raw(FRAME_END)?;

    Ok(out.pos)
}

/// State machine for parsing incoming frames
///
/// Holds everything that must survive between byte arrivals, including the
/// pending-escape flag, so it can be fed straight from a receive interrupt.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    escaped: bool,
    buffer: Vec<u8, MAX_INNER_SIZE>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Discarding bytes until a START marker
    WaitingForStart,
    /// Collecting unescaped bytes until END
    InFrame,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub const fn new() -> Self {
        Self {
            state: ParseState::WaitingForStart,
            escaped: false,
            buffer: Vec::new(),
        }
    }

    /// Reset the parser state, dropping any partial frame
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForStart;
        self.escaped = false;
        self.buffer.clear();
    }

    /// True when no frame is in progress
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::WaitingForStart
    }

    /// True when the last byte seen was an unresolved ESCAPE
    pub fn is_escape_pending(&self) -> bool {
        self.escaped
    }

    fn begin(&mut self) {
        self.state = ParseState::InFrame;
        self.escaped = false;
        self.buffer.clear();
    }

    fn fail(&mut self, error: FrameError) -> Result<Option<Message>, FrameError> {
        self.reset();
        Err(error)
    }

    fn push(&mut self, byte: u8) -> Result<Option<Message>, FrameError> {
        if self.buffer.push(byte).is_err() {
            return self.fail(FrameError::Overflow);
        }
        Ok(None)
    }

    fn finish(&mut self) -> Result<Option<Message>, FrameError> {
        let len = self.buffer.len();
        if len < 4 {
            return self.fail(FrameError::Truncated);
        }

        let (covered, checksum) = self.buffer.split_at(len - 1);
        let body = &covered[3..];
        if covered[2] as usize != body.len() {
            return self.fail(FrameError::LengthMismatch);
        }
        if calculate_checksum(covered) != checksum[0] {
            return self.fail(FrameError::InvalidChecksum);
        }

        let id = MessageId::from_le_bytes([covered[0], covered[1]]);
        let body = match Vec::from_slice(body) {
            Ok(body) => body,
            Err(()) => return self.fail(FrameError::Overflow),
        };

        self.reset();
        Ok(Some(Message::from_parts(id, body)))
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(message))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` when the current frame
    /// had to be discarded. After an error the parser is already waiting for
    /// (or, for [`FrameError::Interrupted`], inside) the next frame.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Message>, FrameError> {
        match self.state {
            ParseState::WaitingForStart => {
                if byte == FRAME_START {
                    self.begin();
                }
                // Silently ignore non-START bytes while waiting
                Ok(None)
            }
            ParseState::InFrame => {
                if byte == FRAME_START {
                    // Restart on this marker; the old frame is lost
                    self.begin();
                    return Err(FrameError::Interrupted);
                }

                if self.escaped {
                    self.escaped = false;
                    let value = byte ^ ESCAPE_MASK;
                    if byte == FRAME_END || !is_reserved(value) {
                        return self.fail(FrameError::InvalidEscape);
                    }
                    return self.push(value);
                }

                match byte {
                    FRAME_ESCAPE => {
                        self.escaped = true;
                        Ok(None)
                    }
                    FRAME_END => self.finish(),
                    _ => self.push(byte),
                }
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete message found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Message>, FrameError> {
        for &byte in bytes {
            if let Some(message) = self.feed(byte)? {
                return Ok(Some(message));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::vec::Vec as StdVec;

    fn decode_all(bytes: &[u8]) -> (StdVec<Message>, StdVec<FrameError>) {
        let mut parser = FrameParser::new();
        let mut messages = StdVec::new();
        let mut errors = StdVec::new();
        for &byte in bytes {
            match parser.feed(byte) {
                Ok(Some(msg)) => messages.push(msg),
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }
        (messages, errors)
    }

    #[test]
    fn test_frame_encode_empty_body() {
        let msg = Message::empty(MessageId(0x0020));
        let mut buffer = [0u8; 10];
        let len = msg.encode(&mut buffer).unwrap();

        assert_eq!(len, 6);
        assert_eq!(buffer[0], FRAME_START);
        assert_eq!(buffer[1], 0x20); // id lo
        assert_eq!(buffer[2], 0x00); // id hi
        assert_eq!(buffer[3], 0); // length
        assert_eq!(buffer[4], 0x20); // checksum (0x20 ^ 0 ^ 0)
        assert_eq!(buffer[5], FRAME_END);
    }

    #[test]
    fn test_frame_encode_escapes_reserved_bytes() {
        let msg = Message::new(MessageId(0x0001), &[FRAME_START, 0x11, FRAME_ESCAPE]).unwrap();
        let encoded = msg.encode_to_vec().unwrap();

        assert_eq!(
            &encoded[..],
            &[
                FRAME_START,
                0x01,
                0x00,
                0x03,
                FRAME_ESCAPE,
                FRAME_START ^ ESCAPE_MASK,
                0x11,
                FRAME_ESCAPE,
                FRAME_ESCAPE ^ ESCAPE_MASK,
                0x01 ^ 0x03 ^ FRAME_START ^ 0x11 ^ FRAME_ESCAPE,
                FRAME_END,
            ]
        );
    }

    #[test]
    fn test_frame_encode_buffer_too_small() {
        let msg = Message::new(MessageId(0x0001), &[1, 2, 3, 4]).unwrap();
        let mut buffer = [0u8; 6];
        assert_eq!(msg.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_encode_rejects_oversized_body() {
        let body = [0u8; MAX_BODY_SIZE + 1];
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        assert_eq!(
            encode(MessageId(1), &body, &mut buffer),
            Err(FrameError::PayloadTooLarge)
        );
    }

    #[test]
    fn test_worst_case_frame_fits() {
        let body = [FRAME_ESCAPE; MAX_BODY_SIZE];
        // Id 0x7E7F forces both id bytes to be escaped as well
        let msg = Message::new(MessageId(0x7F7E), &body).unwrap();
        let encoded = msg.encode_to_vec().unwrap();
        assert!(encoded.len() <= MAX_FRAME_SIZE);

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&encoded).unwrap(), Some(msg));
    }

    #[test]
    fn test_keyboard_report_roundtrip() {
        let body = [0x85, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let original = Message::new(MessageId(0x0002), &body).unwrap();
        let encoded = original.encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&encoded).unwrap().unwrap();

        assert_eq!(parsed.id(), MessageId(0x0002));
        assert_eq!(parsed.body(), &body);
    }

    #[test]
    fn test_parser_invalid_checksum() {
        let msg = Message::new(MessageId(0x0010), &[1, 2, 3]).unwrap();
        let mut encoded = msg.encode_to_vec().unwrap();
        // Corrupt the checksum (second to last byte, no escaping here)
        let idx = encoded.len() - 2;
        encoded[idx] ^= 0x01;

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&encoded), Err(FrameError::InvalidChecksum));
        assert!(parser.is_idle());
    }

    #[test]
    fn test_parser_length_mismatch() {
        // Claims 5 body bytes, carries 2
        let bytes = [FRAME_START, 0x01, 0x00, 0x05, 0xAA, 0xBB, 0x00, FRAME_END];
        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&bytes), Err(FrameError::LengthMismatch));
    }

    #[test]
    fn test_parser_truncated() {
        let bytes = [FRAME_START, 0x01, 0x00, FRAME_END];
        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&bytes), Err(FrameError::Truncated));
    }

    #[test]
    fn test_parser_overflow() {
        let mut parser = FrameParser::new();
        parser.feed(FRAME_START).unwrap();
        let mut result = Ok(None);
        for _ in 0..=MAX_INNER_SIZE {
            result = parser.feed(0x11);
            if result.is_err() {
                break;
            }
        }
        assert_eq!(result, Err(FrameError::Overflow));
        assert!(parser.is_idle());
    }

    #[test]
    fn test_parser_invalid_escape() {
        let mut parser = FrameParser::new();
        assert_eq!(
            parser.feed_bytes(&[FRAME_START, 0x01, FRAME_ESCAPE, 0x42]),
            Err(FrameError::InvalidEscape)
        );
        assert!(parser.is_idle());

        assert_eq!(
            parser.feed_bytes(&[FRAME_START, 0x01, FRAME_ESCAPE, FRAME_END]),
            Err(FrameError::InvalidEscape)
        );
    }

    #[test]
    fn test_escape_at_end_of_input_is_incomplete() {
        let msg = Message::new(MessageId(0x0003), &[FRAME_END, 0x01]).unwrap();
        let encoded = msg.encode_to_vec().unwrap();
        let split = encoded.iter().position(|&b| b == FRAME_ESCAPE).unwrap() + 1;

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&encoded[..split]), Ok(None));
        assert!(parser.is_escape_pending());
        assert_eq!(parser.feed_bytes(&encoded[split..]), Ok(Some(msg)));
    }

    #[test]
    fn test_start_mid_frame_restarts() {
        let msg = Message::new(MessageId(0x0042), &[9, 8, 7]).unwrap();
        let encoded = msg.encode_to_vec().unwrap();

        let mut bytes = StdVec::new();
        bytes.extend_from_slice(&encoded[..4]); // partial frame
        bytes.extend_from_slice(&encoded);

        let (messages, errors) = decode_all(&bytes);
        assert_eq!(messages, [msg]);
        assert_eq!(errors, [FrameError::Interrupted]);
    }

    #[test]
    fn test_parser_resync_after_garbage() {
        let m1 = Message::new(MessageId(0x0001), &[1, 2, 3]).unwrap();
        let m2 = Message::new(MessageId(0x0002), &[FRAME_START, FRAME_END]).unwrap();

        let mut bytes = StdVec::new();
        bytes.extend_from_slice(&m1.encode_to_vec().unwrap());
        bytes.extend_from_slice(&[0x00, 0xFF, FRAME_END, FRAME_ESCAPE, 0x12]);
        bytes.extend_from_slice(&[FRAME_START, 0x34, FRAME_ESCAPE, 0x99]);
        bytes.extend_from_slice(&m2.encode_to_vec().unwrap());

        let (messages, errors) = decode_all(&bytes);
        assert_eq!(messages, [m1, m2]);
        assert_eq!(errors, [FrameError::InvalidEscape]);
    }

    fn arb_message() -> impl Strategy<Value = Message> {
        (
            any::<u16>(),
            proptest::collection::vec(any::<u8>(), 0..=MAX_BODY_SIZE),
        )
            .prop_map(|(id, body)| Message::new(MessageId(id), &body).unwrap())
    }

    proptest! {
        #[test]
        fn prop_roundtrip(msg in arb_message()) {
            let encoded = msg.encode_to_vec().unwrap();
            let mut parser = FrameParser::new();
            prop_assert_eq!(parser.feed_bytes(&encoded).unwrap(), Some(msg));
            prop_assert!(parser.is_idle());
        }

        #[test]
        fn prop_no_unescaped_markers_inside_frame(msg in arb_message()) {
            let encoded = msg.encode_to_vec().unwrap();
            let inner = &encoded[1..encoded.len() - 1];

            prop_assert_eq!(encoded[0], FRAME_START);
            prop_assert_eq!(encoded[encoded.len() - 1], FRAME_END);
            prop_assert!(!inner.contains(&FRAME_START));
            prop_assert!(!inner.contains(&FRAME_END));

            // Every ESCAPE is followed by a masked reserved value
            let mut iter = inner.iter();
            while let Some(&byte) = iter.next() {
                if byte == FRAME_ESCAPE {
                    let next = *iter.next().unwrap();
                    prop_assert!(is_reserved(next ^ ESCAPE_MASK));
                }
            }
        }

        #[test]
        fn prop_resync_after_noise(
            m1 in arb_message(),
            m2 in arb_message(),
            noise in proptest::collection::vec(any::<u8>(), 0..32),
        ) {
            let mut bytes = StdVec::new();
            bytes.extend_from_slice(&m1.encode_to_vec().unwrap());
            bytes.extend_from_slice(&noise);
            bytes.extend_from_slice(&m2.encode_to_vec().unwrap());

            let (messages, _) = decode_all(&bytes);
            prop_assert_eq!(messages.first(), Some(&m1));
            prop_assert_eq!(messages.last(), Some(&m2));
        }

        #[test]
        fn prop_parser_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let _ = decode_all(&bytes);
        }
    }
}
