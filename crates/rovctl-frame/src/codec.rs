use bytes::{Buf, BufMut, BytesMut};

use crate::checksum::checksum;
use crate::error::{FrameError, Result};

/// Frame length on the wire: sequence (4) + payload (8) + checksum (4).
pub const FRAME_SIZE: usize = 16;

/// Number of leading bytes covered by the checksum.
pub const CHECKED_LEN: usize = 12;

/// A validated command frame, fields in host byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireFrame {
    /// Advisory sequence number. Not used for ordering.
    pub sequence: u32,
    /// Bit-packed control vector.
    pub payload: u64,
    /// The transmitted checksum.
    pub checksum: u32,
}

impl WireFrame {
    /// Build a frame with a freshly computed checksum.
    pub fn new(sequence: u32, payload: u64) -> Self {
        let mut head = [0u8; CHECKED_LEN];
        head[..4].copy_from_slice(&sequence.to_be_bytes());
        head[4..].copy_from_slice(&payload.to_be_bytes());
        Self {
            sequence,
            payload,
            checksum: checksum(&head),
        }
    }

    /// Serialize to the 16-byte wire layout.
    pub fn to_bytes(&self) -> [u8; FRAME_SIZE] {
        let mut out = [0u8; FRAME_SIZE];
        out[..4].copy_from_slice(&self.sequence.to_be_bytes());
        out[4..12].copy_from_slice(&self.payload.to_be_bytes());
        out[12..].copy_from_slice(&self.checksum.to_be_bytes());
        out
    }
}

/// Encode a frame into the wire format.
///
/// Wire format (all fields big-endian):
/// ```text
/// ┌──────────────┬─────────────────┬──────────────┐
/// │ Sequence     │ Payload         │ CRC-32       │
/// │ (4B BE)      │ (8B BE)         │ (4B BE)      │
/// │              │                 │ over 0..12   │
/// └──────────────┴─────────────────┴──────────────┘
/// ```
pub fn encode_frame(sequence: u32, payload: u64, dst: &mut BytesMut) {
    dst.reserve(FRAME_SIZE);
    let start = dst.len();
    dst.put_u32(sequence);
    dst.put_u64(payload);
    let crc = checksum(&dst[start..start + CHECKED_LEN]);
    dst.put_u32(crc);
}

/// Validate one received datagram.
///
/// The length is checked first; the checksum is only computed for
/// datagrams of exactly [`FRAME_SIZE`] bytes.
pub fn validate_frame(datagram: &[u8]) -> Result<WireFrame> {
    if datagram.len() != FRAME_SIZE {
        return Err(FrameError::WrongSize {
            len: datagram.len(),
            expected: FRAME_SIZE,
        });
    }

    let computed = checksum(&datagram[..CHECKED_LEN]);

    let mut src = datagram;
    let sequence = src.get_u32();
    let payload = src.get_u64();
    let received = src.get_u32();

    if received != computed {
        return Err(FrameError::ChecksumMismatch { received, computed });
    }

    Ok(WireFrame {
        sequence,
        payload,
        checksum: received,
    })
}
