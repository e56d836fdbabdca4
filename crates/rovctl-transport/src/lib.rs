//! UDP datagram transport and link readiness signalling.
//!
//! This is the lowest layer of rovctl. It provides:
//! - A blocking UDP socket bound to the command port
//! - The [`LinkSignal`] gate the receiver waits on before touching the network
//! - Link event sources that drive that signal (static bring-up, operstate polling)
//!
//! Everything else builds on the [`DatagramSource`] seam provided here.

pub mod error;
pub mod link;
pub mod traits;
pub mod udp;
pub mod watch;

pub use error::{Result, TransportError};
pub use link::{LinkEvent, LinkPublisher, LinkSignal, LinkState};
pub use traits::DatagramSource;
pub use udp::{UdpSocket, DEFAULT_PORT};
pub use watch::{OperstateWatcher, StaticLink};
