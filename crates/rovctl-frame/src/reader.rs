use std::io::ErrorKind;

use rovctl_transport::DatagramSource;
use tracing::trace;

use crate::codec::{validate_frame, WireFrame};
use crate::error::{FrameError, Result};

/// Receive buffer size. Larger datagrams are truncated and fail the size check.
pub const MAX_DATAGRAM_SIZE: usize = 64;

/// Receives and validates one frame per datagram.
pub struct FrameReceiver<S> {
    inner: S,
    buf: [u8; MAX_DATAGRAM_SIZE],
}

impl<S: DatagramSource> FrameReceiver<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buf: [0u8; MAX_DATAGRAM_SIZE],
        }
    }

    /// Block for the next datagram and validate it.
    ///
    /// Malformed datagrams are returned as errors; the caller decides whether
    /// to keep receiving.
    pub fn recv_frame(&mut self) -> Result<WireFrame> {
        let len = loop {
            match self.inner.recv(&mut self.buf) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        };
        trace!(len, "datagram received");
        validate_frame(&self.buf[..len])
    }
}
