use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;
use vigil_dns_domain::ResolverError;

/// DNS over TCP (RFC 1035 §4.2.2): each message is preceded by a
/// two-octet big-endian length. Used as the fallback when a UDP answer
/// arrives truncated.
pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    fn map_io_error(&self, error: std::io::Error) -> ResolverError {
        match error.kind() {
            ErrorKind::ConnectionRefused => ResolverError::TransportConnectionRefused {
                server: self.server_addr,
            },
            ErrorKind::ConnectionReset => ResolverError::TransportConnectionReset {
                server: self.server_addr,
            },
            _ => ResolverError::Io(format!("{}: {}", self.server_addr, error)),
        }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, std::io::Error> {
        let mut stream = TcpStream::connect(self.server_addr).await?;

        let len = (message_bytes.len() as u16).to_be_bytes();
        stream.write_all(&len).await?;
        stream.write_all(message_bytes).await?;

        let mut len_buf = [0u8; 2];
        stream.read_exact(&mut len_buf).await?;
        let response_len = u16::from_be_bytes(len_buf) as usize;

        let mut response = vec![0u8; response_len];
        stream.read_exact(&mut response).await?;
        Ok(response)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, ResolverError> {
        let bytes = tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| ResolverError::TransportTimeout {
                server: self.server_addr,
            })?
            .map_err(|e| self.map_io_error(e))?;

        debug!(
            server = %self.server_addr,
            bytes_received = bytes.len(),
            "TCP response received"
        );

        Ok(TransportResponse { bytes })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}
