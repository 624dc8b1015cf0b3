//! # miniapp-mcp
//!
//! Protocol adapter exposing miniprogram UI-automation operations as
//! remotely invokable tools over three transports:
//!
//! - a socket binding (one JSON command per connection),
//! - an HTTP binding (`POST /api/command`),
//! - a stdio MCP binding (JSON-RPC 2.0, the standard MCP transport).
//!
//! The crate only translates: a transport binding decodes its wire format
//! into a [`Command`], the [`CommandRouter`] validates the arguments and
//! invokes the automation driver, and the binding encodes the result back
//! into its own envelope. The driver itself is an external collaborator
//! behind the [`driver`] capability traits.
//!
//! ## Usage with an MCP client
//!
//! The shipped binary bridges stdio MCP to a running socket-binding host:
//!
//! ```json
//! {
//!   "servers": {
//!     "miniapp": {
//!       "command": "miniapp-mcp",
//!       "args": ["--connect", "127.0.0.1:8888"],
//!       "env": {}
//!     }
//!   }
//! }
//! ```
//!
//! ## Embedding
//!
//! With a driver implementation in hand, all three bindings can be served
//! in-process: [`SocketServer`] and [`http::serve`] over a
//! [`CommandRouter`], or [`McpServer`] over a [`RouterBackend`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod connector;
pub mod driver;
pub mod error;
pub mod http;
pub mod manifest;
pub mod protocol;
pub mod router;
pub mod server;
pub mod socket;

pub use catalog::{tool_definitions, ToolName, TOOL_PREFIX};
pub use connector::RemoteEndpoint;
pub use error::{Error, Result};
pub use protocol::{Command, JsonRpcRequest, JsonRpcResponse, McpMessage, WireResponse};
pub use router::{CommandRouter, Reply};
pub use server::{CommandBackend, McpServer, RouterBackend};
pub use socket::SocketServer;
