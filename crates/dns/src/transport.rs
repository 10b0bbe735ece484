use std::fmt;
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream, UdpSocket};
use std::time::Duration;

use tracing::debug;

use crate::error::TransportError;

pub const DNS_PORT: u16 = 53;

/// How long a UDP exchange waits for the reply datagram.
pub const DEFAULT_UDP_TIMEOUT: Duration = Duration::from_secs(5);

/// Reply buffer for UDP exchanges.
const UDP_BUFFER_SIZE: usize = 4096;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Protocol {
    Udp,
    Tcp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Udp => write!(f, "UDP"),
            Protocol::Tcp => write!(f, "TCP"),
        }
    }
}

/// One blocking request/response exchange with a name server.
///
/// The resolver only ever talks through this trait, so tests can swap the
/// network out for scripted replies.
pub trait Transport {
    fn exchange(
        &mut self,
        server: SocketAddr,
        protocol: Protocol,
        request: &[u8],
    ) -> Result<Vec<u8>, TransportError>;
}

/// Real sockets. UDP failures past the timeout surface as
/// [`TransportError::Timeout`]; TCP exchanges are length-prefixed with a
/// 16-bit big-endian count in both directions (RFC 1035 §4.2.2) and honor
/// an optional deadline on connect/read/write.
#[derive(Debug)]
pub struct NetTransport {
    udp_timeout: Duration,
    tcp_deadline: Option<Duration>,
}

impl NetTransport {
    pub fn new(udp_timeout: Duration, tcp_deadline: Option<Duration>) -> Self {
        Self {
            udp_timeout,
            tcp_deadline,
        }
    }

    fn exchange_udp(
        &self,
        server: SocketAddr,
        request: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.set_read_timeout(Some(self.udp_timeout))?;
        socket.send_to(request, server)?;

        let mut buffer = vec![0u8; UDP_BUFFER_SIZE];
        let (received, _) = socket.recv_from(&mut buffer).map_err(|e| {
            if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) {
                TransportError::Timeout
            } else {
                TransportError::Io(e)
            }
        })?;
        buffer.truncate(received);
        Ok(buffer)
    }

    fn exchange_tcp(
        &self,
        server: SocketAddr,
        request: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        let mut stream = match self.tcp_deadline {
            Some(deadline) => TcpStream::connect_timeout(&server, deadline)?,
            None => TcpStream::connect(server)?,
        };
        stream.set_read_timeout(self.tcp_deadline)?;
        stream.set_write_timeout(self.tcp_deadline)?;

        let mut framed = Vec::with_capacity(request.len() + 2);
        framed.extend_from_slice(&(request.len() as u16).to_be_bytes());
        framed.extend_from_slice(request);
        stream.write_all(&framed)?;

        let mut length_bytes = [0u8; 2];
        stream.read_exact(&mut length_bytes)?;
        let length = u16::from_be_bytes(length_bytes) as usize;

        let mut response = vec![0u8; length];
        stream.read_exact(&mut response)?;
        Ok(response)
    }
}

impl Default for NetTransport {
    fn default() -> Self {
        Self::new(DEFAULT_UDP_TIMEOUT, None)
    }
}

impl Transport for NetTransport {
    fn exchange(
        &mut self,
        server: SocketAddr,
        protocol: Protocol,
        request: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        debug!(%server, %protocol, bytes = request.len(), "sending query");
        match protocol {
            Protocol::Udp => self.exchange_udp(server, request),
            Protocol::Tcp => self.exchange_tcp(server, request),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{TcpListener, UdpSocket};
    use std::thread;

    use super::*;

    #[test]
    fn test_udp_exchange_loopback() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let server_addr = server.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let mut buffer = [0u8; 512];
            let (received, peer) = server.recv_from(&mut buffer).unwrap();
            server.send_to(&buffer[..received], peer).unwrap();
        });

        let mut transport = NetTransport::default();
        let reply = transport
            .exchange(server_addr, Protocol::Udp, b"ping")
            .unwrap();
        assert_eq!(reply, b"ping");
        handle.join().unwrap();
    }

    #[test]
    fn test_udp_timeout_is_distinguished() {
        // A socket nobody answers on.
        let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
        let server_addr = silent.local_addr().unwrap();

        let mut transport = NetTransport::new(Duration::from_millis(50), None);
        let result = transport.exchange(server_addr, Protocol::Udp, b"ping");
        assert!(matches!(result, Err(TransportError::Timeout)));
    }

    #[test]
    fn test_tcp_exchange_is_length_prefixed() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let server_addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut length_bytes = [0u8; 2];
            stream.read_exact(&mut length_bytes).unwrap();
            let length = u16::from_be_bytes(length_bytes) as usize;
            let mut request = vec![0u8; length];
            stream.read_exact(&mut request).unwrap();
            assert_eq!(request, b"hello");

            stream.write_all(&3u16.to_be_bytes()).unwrap();
            stream.write_all(b"dns").unwrap();
        });

        let mut transport = NetTransport::default();
        let reply = transport
            .exchange(server_addr, Protocol::Tcp, b"hello")
            .unwrap();
        assert_eq!(reply, b"dns");
        handle.join().unwrap();
    }
}
