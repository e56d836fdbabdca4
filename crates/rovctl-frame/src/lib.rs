//! CRC-32 checked fixed-size command frames.
//!
//! Every command arrives as one 16-byte datagram:
//! - A 4-byte big-endian sequence number
//! - An 8-byte big-endian bit-packed control payload
//! - A 4-byte big-endian CRC-32 over the first 12 bytes
//!
//! A frame is accepted only when its length is exactly 16 and the checksum
//! matches. Nothing else is inspected.

pub mod checksum;
pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use checksum::checksum;
pub use codec::{encode_frame, validate_frame, WireFrame, CHECKED_LEN, FRAME_SIZE};
pub use error::{FrameError, Result};
pub use reader::{FrameReceiver, MAX_DATAGRAM_SIZE};
pub use writer::FrameSender;
