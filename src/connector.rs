//! Socket client used by the stdio binding's out-of-process mode.
//!
//! Commands are forwarded to a socket-binding host, one fresh connection
//! per command, and the response is reassembled with the chunked decoder.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::catalog;
use crate::error::{Error, Result};
use crate::protocol::{Command, ToolDefinition, WireResponse, WireStatus};
use crate::router::Reply;
use crate::server::CommandBackend;

/// Read size for one chunk of a response.
const RECV_BUFFER_BYTES: usize = 8192;

/// Client for a remote socket-binding automation host.
pub struct RemoteEndpoint {
    addr: String,
}

impl RemoteEndpoint {
    /// Client for the host at `addr` (e.g. `127.0.0.1:8888`).
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Send one command and wait for its response.
    ///
    /// On a connection-level fault the endpoint reconnects once and
    /// resubmits the exact same command; a command-level error reported by
    /// the host is surfaced without retry.
    pub async fn send_command(&self, command: &Command) -> Result<WireResponse> {
        match self.roundtrip(command).await {
            Err(e) if e.is_connection() => {
                tracing::warn!(error = %e, "connection fault, reconnecting and retrying");
                self.roundtrip(command).await
            }
            other => other,
        }
    }

    async fn roundtrip(&self, command: &Command) -> Result<WireResponse> {
        let mut stream = TcpStream::connect(&self.addr).await?;
        stream.write_all(&serde_json::to_vec(command)?).await?;

        let data = receive_full_response(&mut stream).await?;
        let response: WireResponse = serde_json::from_slice(&data)?;
        match response.status {
            WireStatus::Success => Ok(response),
            // The host's router already classified the failure; carry its
            // message through as-is.
            WireStatus::Error => Err(Error::Driver(
                response
                    .message
                    .unwrap_or_else(|| "unknown error from automation host".into()),
            )),
        }
    }
}

#[async_trait::async_trait]
impl CommandBackend for RemoteEndpoint {
    fn tools(&self) -> Vec<ToolDefinition> {
        catalog::prefixed_tool_definitions()
    }

    async fn call(&self, command: &Command) -> Result<Reply> {
        let response = self.send_command(command).await?;
        if response.kind.as_deref() == Some("image") {
            Ok(Reply::Image {
                data: response.data.unwrap_or_default(),
            })
        } else {
            Ok(Reply::Message(response.message.unwrap_or_default()))
        }
    }
}

/// Accumulate chunks from `reader` until they parse as one complete JSON
/// document, and return the raw bytes.
///
/// A zero-byte read before anything was buffered is
/// [`Error::ConnectionClosed`]; a close mid-message gets one final parse
/// attempt and then fails with [`Error::IncompleteResponse`].
pub async fn receive_full_response<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut data = Vec::new();
    let mut chunk = [0u8; RECV_BUFFER_BYTES];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            if data.is_empty() {
                return Err(Error::ConnectionClosed);
            }
            break;
        }
        data.extend_from_slice(&chunk[..n]);

        if serde_json::from_slice::<serde::de::IgnoredAny>(&data).is_ok() {
            tracing::debug!(bytes = data.len(), "received complete response");
            return Ok(data);
        }
    }

    // Channel closed; use what we have if it happens to be complete.
    if serde_json::from_slice::<serde::de::IgnoredAny>(&data).is_ok() {
        Ok(data)
    } else {
        Err(Error::IncompleteResponse)
    }
}
