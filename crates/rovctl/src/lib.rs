//! UDP command-link controller for remotely operated vehicles.
//!
//! rovctl receives fixed-size, CRC-32 protected command frames over UDP,
//! decodes them into six-axis motion demands plus light and manipulator
//! settings, and hands them to an actuation layer through a bounded queue.
//!
//! # Crate Structure
//!
//! - [`transport`]: UDP socket, link readiness signal and link event sources
//! - [`frame`]: checksum engine and the 16-byte wire frame codec
//! - [`control`]: command decoding, the bounded queue, receiver and dispatcher tasks

/// Re-export transport types.
pub mod transport {
    pub use rovctl_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use rovctl_frame::*;
}

/// Re-export control types.
pub mod control {
    pub use rovctl_control::*;
}
