//! Socket binding: one JSON command per connection.
//!
//! A request is a single `{name, arguments}` object sent on a fresh
//! connection; the serialized [`WireResponse`] is written back and the
//! connection closes. No connection reuse, no pipelining.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::error::Result;
use crate::protocol::{Command, WireResponse};
use crate::router::CommandRouter;

/// Upper bound on one request; whole-message JSON must fit in a single read.
const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Socket-binding server over a command router.
pub struct SocketServer {
    router: Arc<CommandRouter>,
}

impl SocketServer {
    /// Create a server over the given router.
    pub fn new(router: Arc<CommandRouter>) -> Self {
        Self { router }
    }

    /// Bind `addr` and serve forever.
    pub async fn run(self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "socket binding listening");
        self.serve(listener).await
    }

    /// Serve on an already-bound listener.
    ///
    /// Connections are handled one at a time; a faulting handler closes
    /// its own connection and the accept loop carries on.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            tracing::debug!(%peer, "accepted connection");
            if let Err(e) = self.handle_connection(stream).await {
                tracing::error!(error = %e, "connection handler failed");
            }
        }
    }

    async fn handle_connection(&self, mut stream: TcpStream) -> Result<()> {
        let mut buf = vec![0u8; MAX_REQUEST_BYTES];
        let n = stream.read(&mut buf).await?;

        let response = match serde_json::from_slice::<Command>(&buf[..n]) {
            Ok(command) => WireResponse::from_result(self.router.dispatch(&command).await),
            Err(e) => WireResponse::error(format!("malformed command: {e}")),
        };

        stream.write_all(&serde_json::to_vec(&response)?).await?;
        stream.shutdown().await?;
        Ok(())
    }
}
