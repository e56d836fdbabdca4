use std::net::ToSocketAddrs;

use rovctl_transport::UdpSocket;
use tracing::debug;

use crate::codec::{WireFrame, FRAME_SIZE};
use crate::error::{FrameError, Result};

/// XOR mask applied to the checksum when deliberately corrupting a frame.
pub const CORRUPTION_MASK: u32 = 0xDEAD_BEEF;

/// Sends command frames to a controller.
pub struct FrameSender {
    socket: UdpSocket,
}

impl FrameSender {
    pub fn connect(peer: impl ToSocketAddrs) -> Result<Self> {
        let socket = UdpSocket::connect(peer).map_err(transport_to_frame_error)?;
        Ok(Self { socket })
    }

    /// Encode and send one frame, returning what went on the wire.
    pub fn send(&self, sequence: u32, payload: u64) -> Result<WireFrame> {
        self.send_frame(WireFrame::new(sequence, payload))
    }

    /// Send a frame whose checksum has been corrupted.
    pub fn send_corrupted(&self, sequence: u32, payload: u64) -> Result<WireFrame> {
        let mut frame = WireFrame::new(sequence, payload);
        frame.checksum ^= CORRUPTION_MASK;
        self.send_frame(frame)
    }

    /// Send an already assembled frame as-is.
    pub fn send_frame(&self, frame: WireFrame) -> Result<WireFrame> {
        let bytes = frame.to_bytes();
        let sent = self.socket.send(&bytes)?;
        if sent != FRAME_SIZE {
            return Err(FrameError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                format!("short datagram ({sent} of {FRAME_SIZE} bytes)"),
            )));
        }
        debug!(
            sequence = frame.sequence,
            payload = %format!("{:#018x}", frame.payload),
            checksum = %format!("{:#010x}", frame.checksum),
            "frame sent"
        );
        Ok(frame)
    }
}

fn transport_to_frame_error(err: rovctl_transport::TransportError) -> FrameError {
    match err {
        rovctl_transport::TransportError::Io(io)
        | rovctl_transport::TransportError::Bind { source: io, .. } => FrameError::Io(io),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddr};

    use super::*;
    use crate::codec::validate_frame;
    use crate::reader::FrameReceiver;

    fn server() -> UdpSocket {
        UdpSocket::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).unwrap()
    }

    #[test]
    fn sent_frame_validates() {
        let server = server();
        let sender = FrameSender::connect(server.local_addr()).unwrap();

        let sent = sender.send(1, 0x0080_8080_8080_8080).unwrap();

        let mut receiver = FrameReceiver::new(&server);
        assert_eq!(receiver.recv_frame().unwrap(), sent);
    }

    #[test]
    fn corrupted_frame_is_rejected() {
        let server = server();
        let sender = FrameSender::connect(server.local_addr()).unwrap();

        let sent = sender.send_corrupted(255, 0x5555_AAAA_5555_AAAA).unwrap();
        assert_eq!(
            sent.checksum ^ CORRUPTION_MASK,
            WireFrame::new(255, 0x5555_AAAA_5555_AAAA).checksum
        );
        assert!(validate_frame(&sent.to_bytes()).is_err());

        let mut receiver = FrameReceiver::new(&server);
        assert!(matches!(
            receiver.recv_frame(),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }
}
