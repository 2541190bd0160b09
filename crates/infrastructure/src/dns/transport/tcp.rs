//! TCP Transport for DNS queries (RFC 1035 §4.2.2)
//!
//! Every message is preceded by a 2-byte big-endian length. The stream stays
//! open between exchanges.

use super::TransportError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

#[derive(Debug)]
pub struct TcpConnection {
    server_addr: SocketAddr,
    stream: TcpStream,
}

impl TcpConnection {
    pub async fn dial(server_addr: SocketAddr, timeout: Duration) -> Result<Self, TransportError> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(server_addr))
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

        stream
            .set_nodelay(true)
            .map_err(|source| TransportError::Io {
                phase: "configuring socket for",
                server: server_addr,
                source,
            })?;

        debug!(server = %server_addr, "TCP connection established");

        Ok(Self {
            server_addr,
            stream,
        })
    }

    pub async fn exchange(
        &mut self,
        message_bytes: &[u8],
        write_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        let server = self.server_addr;

        tokio::time::timeout(
            write_timeout,
            send_with_length_prefix(&mut self.stream, message_bytes, server),
        )
        .await
        .map_err(|_| TransportError::Timeout {
            phase: "sending TCP query to",
            server,
        })??;

        debug!(
            server = %server,
            message_len = message_bytes.len(),
            "TCP query sent"
        );

        let response_bytes = tokio::time::timeout(
            read_timeout,
            read_with_length_prefix(&mut self.stream, server),
        )
        .await
        .map_err(|_| TransportError::Timeout {
            phase: "waiting for TCP response from",
            server,
        })??;

        debug!(
            server = %server,
            response_len = response_bytes.len(),
            "TCP response received"
        );

        Ok(response_bytes)
    }
}

pub(crate) async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
    server: SocketAddr,
) -> Result<(), TransportError>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len())
        .map_err(|_| TransportError::QueryTooLarge(message_bytes.len()))?;

    let io_err = |source| TransportError::Io {
        phase: "writing to",
        server,
        source,
    };

    stream.write_all(&length.to_be_bytes()).await.map_err(io_err)?;
    stream.write_all(message_bytes).await.map_err(io_err)?;
    stream.flush().await.map_err(io_err)?;

    Ok(())
}

pub(crate) async fn read_with_length_prefix<S>(
    stream: &mut S,
    server: SocketAddr,
) -> Result<Vec<u8>, TransportError>
where
    S: AsyncReadExt + Unpin,
{
    let io_err = |source| TransportError::Io {
        phase: "reading from",
        server,
        source,
    };

    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await.map_err(io_err)?;

    let response_len = u16::from_be_bytes(len_buf) as usize;
    let mut response = vec![0u8; response_len];
    stream.read_exact(&mut response).await.map_err(io_err)?;

    Ok(response)
}
