use std::io;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Well-known command port.
pub const DEFAULT_PORT: u16 = 12345;

/// Blocking UDP socket.
///
/// Thin wrapper over [`std::net::UdpSocket`] that keeps the bound address for
/// diagnostics and maps bind failures to [`TransportError::Bind`].
#[derive(Debug)]
pub struct UdpSocket {
    inner: std::net::UdpSocket,
    local: SocketAddr,
}

impl UdpSocket {
    /// Bind to an explicit address.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let inner =
            std::net::UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        let local = inner
            .local_addr()
            .map_err(|source| TransportError::Bind { addr, source })?;

        info!(%local, "udp socket bound");

        Ok(Self { inner, local })
    }

    /// Bind an ephemeral socket suitable for sending to `peer`.
    pub fn connect(peer: impl ToSocketAddrs) -> Result<Self> {
        let socket = Self::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))?;
        socket.inner.connect(peer)?;
        debug!(local = %socket.local, "udp socket connected");
        Ok(socket)
    }

    /// Receive one datagram (blocking), returning its length and sender.
    pub fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.inner.recv_from(buf)
    }

    /// Send one datagram to the connected peer.
    pub fn send(&self, buf: &[u8]) -> io::Result<usize> {
        self.inner.send(buf)
    }

    /// Set the read timeout. `None` blocks indefinitely.
    pub fn set_read_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// The address this socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }
}
