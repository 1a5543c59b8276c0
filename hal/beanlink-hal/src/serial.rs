//! Serial link abstractions
//!
//! Provides the byte sink/source capability that chip-specific HALs
//! implement for the UART wired to the peer controller.

/// Outbound byte sink (UART TX)
///
/// Writes may block briefly while the hardware FIFO drains, but must not
/// wait on anything the receive interrupt needs.
pub trait ByteSink {
    /// Error type for transmit operations
    type Error;

    /// Write a single byte
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Write a whole buffer
    ///
    /// Returns once every byte has been handed to the hardware.
    fn write_buffer(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for &byte in data {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Polled inbound byte source (UART RX)
///
/// Interrupt-driven receivers call the assembler directly instead; this
/// trait covers receivers that are drained from a loop.
pub trait ByteSource {
    /// Error type for receive operations
    type Error;

    /// Copy whatever bytes are already available into `buf`
    ///
    /// Never waits. Returns 0 when nothing is pending.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    type Error = T::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        (**self).write_byte(byte)
    }

    fn write_buffer(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write_buffer(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush()
    }
}

/// Adapter exposing any blocking [`embedded_io::Write`] as a [`ByteSink`]
///
/// Lets a board hand over its HAL UART (`BlockingUart`, `BufferedUartTx`
/// wrapped in a blocking writer, etc.) without writing a dedicated impl.
#[derive(Debug)]
pub struct IoSink<W>(pub W);

impl<W> IoSink<W> {
    /// Wrap a writer
    pub const fn new(writer: W) -> Self {
        Self(writer)
    }

    /// Give the writer back
    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: embedded_io::Write> ByteSink for IoSink<W> {
    type Error = W::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.0.write_all(&[byte])
    }

    fn write_buffer(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.flush()
    }
}
