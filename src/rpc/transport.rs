//! Transport abstraction: any byte-oriented channel to the host.
//!
//! Concrete implementations:
//! - USB-Serial-JTAG (native USB CDC on ESP32-S3), see `adapters::usb_serial`
//!
//! The command engine is generic over `Transport`, so adding a new link
//! requires zero changes to the dispatch logic.

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read.
    /// Returns 0 if no data is available (non-blocking).
    ///
    /// Each successful read is treated as one frame by the engine.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}
