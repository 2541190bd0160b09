pub mod tcp;
pub mod udp;

use ferrous_doh_domain::UpstreamProtocol;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub use tcp::TcpConnection;
pub use udp::UdpConnection;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Timeout {phase} {server}")]
    Timeout {
        phase: &'static str,
        server: SocketAddr,
    },

    #[error("I/O error while {phase} {server}: {source}")]
    Io {
        phase: &'static str,
        server: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Query too large for TCP framing: {0} bytes")]
    QueryTooLarge(usize),
}

/// One established connection to the upstream resolver.
#[derive(Debug)]
pub enum UpstreamConnection {
    Udp(UdpConnection),
    Tcp(TcpConnection),
}

impl UpstreamConnection {
    pub async fn dial(
        protocol: UpstreamProtocol,
        server: SocketAddr,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        match protocol {
            UpstreamProtocol::Udp => Ok(Self::Udp(UdpConnection::dial(server, timeout).await?)),
            UpstreamProtocol::Tcp => Ok(Self::Tcp(TcpConnection::dial(server, timeout).await?)),
        }
    }

    /// Writes one wire-format message and reads exactly one back.
    pub async fn exchange(
        &mut self,
        message_bytes: &[u8],
        write_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        match self {
            Self::Udp(conn) => conn.exchange(message_bytes, write_timeout, read_timeout).await,
            Self::Tcp(conn) => conn.exchange(message_bytes, write_timeout, read_timeout).await,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(_) => "UDP",
            Self::Tcp(_) => "TCP",
        }
    }
}
