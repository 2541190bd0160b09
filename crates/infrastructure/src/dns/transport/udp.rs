//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Messages are sent as-is (no framing) over a socket connected to the
//! upstream, so the kernel drops datagrams from any other source.

use super::TransportError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

#[derive(Debug)]
pub struct UdpConnection {
    server_addr: SocketAddr,
    socket: UdpSocket,
}

impl UdpConnection {
    pub async fn dial(server_addr: SocketAddr, timeout: Duration) -> Result<Self, TransportError> {
        let bind_addr: SocketAddr = if server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let dial = async {
            let socket = UdpSocket::bind(bind_addr).await?;
            socket.connect(server_addr).await?;
            Ok::<_, std::io::Error>(socket)
        };

        let socket = tokio::time::timeout(timeout, dial)
            .await
            .map_err(|_| TransportError::Timeout {
                phase: "connecting to",
                server: server_addr,
            })?
            .map_err(|source| TransportError::Io {
                phase: "connecting to",
                server: server_addr,
                source,
            })?;

        debug!(server = %server_addr, "UDP socket connected");

        Ok(Self {
            server_addr,
            socket,
        })
    }

    pub async fn exchange(
        &mut self,
        message_bytes: &[u8],
        write_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        let server = self.server_addr;

        let bytes_sent = tokio::time::timeout(write_timeout, self.socket.send(message_bytes))
            .await
            .map_err(|_| TransportError::Timeout {
                phase: "sending UDP query to",
                server,
            })?
            .map_err(|source| TransportError::Io {
                phase: "sending UDP query to",
                server,
                source,
            })?;

        debug!(server = %server, bytes_sent = bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        let bytes_received = tokio::time::timeout(read_timeout, self.socket.recv(&mut recv_buf))
            .await
            .map_err(|_| TransportError::Timeout {
                phase: "waiting for UDP response from",
                server,
            })?
            .map_err(|source| TransportError::Io {
                phase: "receiving UDP response from",
                server,
                source,
            })?;

        recv_buf.truncate(bytes_received);

        debug!(
            server = %server,
            bytes_received = bytes_received,
            "UDP response received"
        );

        Ok(recv_buf)
    }
}
