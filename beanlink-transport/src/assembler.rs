//! Receive assembler
//!
//! Owned by the receive context (UART RX interrupt or a polling task).
//! Turns bytes into messages and hands them to the dispatcher without
//! allocating or waiting.

use embassy_sync::blocking_mutex::raw::RawMutex;

use beanlink_hal::ByteSource;
use beanlink_protocol::FrameParser;

use crate::dispatch::Dispatcher;

/// Bytes pulled from a polled source per read
const DRAIN_CHUNK: usize = 16;

/// Byte-at-a-time frame assembly feeding a [`Dispatcher`]
///
/// The parser (including its escape flag and partial frame) lives here and
/// is touched by nobody else.
pub struct ReceiveAssembler<'d, M: RawMutex, const N: usize> {
    parser: FrameParser,
    dispatcher: &'d Dispatcher<M, N>,
}

impl<'d, M: RawMutex, const N: usize> ReceiveAssembler<'d, M, N> {
    pub const fn new(dispatcher: &'d Dispatcher<M, N>) -> Self {
        Self {
            parser: FrameParser::new(),
            dispatcher,
        }
    }

    /// Process one received byte
    ///
    /// Bounded work: one parser step and, on a complete frame, one short
    /// critical section in the dispatcher.
    pub fn on_byte_received(&mut self, byte: u8) {
        match self.parser.feed(byte) {
            Ok(Some(message)) => {
                trace!("RX message {} ({} bytes)", message.id(), message.body_len());
                self.dispatcher.submit_completed(message);
            }
            Ok(None) => {
                // Need more bytes
            }
            Err(e) => {
                // Parser has already resynchronised
                debug!("Frame parse error: {}", e);
                self.dispatcher.stats().record_framing_error();
            }
        }
    }

    /// Process a run of received bytes
    pub fn on_bytes_received(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.on_byte_received(byte);
        }
    }

    /// The line went idle (UART idle interrupt or sync timeout)
    ///
    /// A frame still in progress can no longer complete, including one that
    /// stopped on an escape byte, so it is dropped and counted.
    pub fn on_line_idle(&mut self) {
        if !self.parser.is_idle() {
            debug!("Line idle mid-frame, discarding partial frame");
            self.parser.reset();
            self.dispatcher.stats().record_framing_error();
        }
    }

    /// Feed every byte a polled source has ready
    ///
    /// Returns the number of bytes processed.
    pub fn drain<S: ByteSource>(&mut self, source: &mut S) -> Result<usize, S::Error> {
        let mut buf = [0u8; DRAIN_CHUNK];
        let mut total = 0;

        loop {
            let n = source.read_available(&mut buf)?;
            if n == 0 {
                return Ok(total);
            }
            self.on_bytes_received(&buf[..n]);
            total += n;
        }
    }

    /// True when no frame is partially received
    pub fn is_idle(&self) -> bool {
        self.parser.is_idle()
    }

    pub fn dispatcher(&self) -> &'d Dispatcher<M, N> {
        self.dispatcher
    }
}
