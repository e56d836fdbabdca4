//! CRC-32 (reflected polynomial 0xEDB88320, init 0xFFFFFFFF, final complement).
//!
//! This is CRC-32/ISO-HDLC. The remote sender computes the same code bit by
//! bit. Any change to the polynomial, the initial register or the final
//! complement breaks every frame on the wire.

use crc::{Crc, CRC_32_ISO_HDLC};

/// Reflected form of the IEEE 802.3 polynomial 0x04C11DB7.
pub const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Initial register value.
pub const INIT: u32 = 0xFFFF_FFFF;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Compute the frame checksum over `bytes`.
pub fn checksum(bytes: &[u8]) -> u32 {
    CRC32.checksum(bytes)
}
