use std::io;

use crate::udp::UdpSocket;

/// A blocking source of whole datagrams.
///
/// Each call to [`recv`](DatagramSource::recv) yields exactly one datagram.
/// Bytes beyond `buf.len()` are discarded by the source, so the returned
/// length never exceeds the buffer.
pub trait DatagramSource {
    /// Block until the next datagram arrives and copy it into `buf`.
    fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;
}

impl DatagramSource for UdpSocket {
    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.recv_from(buf).map(|(n, _)| n)
    }
}

impl<T: DatagramSource + ?Sized> DatagramSource for &T {
    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).recv(buf)
    }
}
