//! Error types for the automation adapter.

use thiserror::Error;

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter errors.
///
/// Protocol, session-state and driver errors are caught at the router
/// boundary and encoded into the calling transport's error envelope;
/// connection errors are handled per binding.
#[derive(Error, Debug)]
pub enum Error {
    /// Command name not in the tool catalog.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A required argument is absent from the argument map.
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// An argument is present but has the wrong shape.
    #[error("invalid argument {name}: {reason}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Command issued before `open` or after `shutdown`.
    #[error("no active session, open a project first")]
    NoSession,

    /// Host OS has no known developer-tool CLI location.
    #[error("unsupported operating system")]
    UnsupportedPlatform,

    /// Fault raised by the automation driver during an operation.
    #[error("{0}")]
    Driver(String),

    /// Channel closed before any response bytes arrived.
    #[error("connection closed before receiving any data")]
    ConnectionClosed,

    /// Channel closed mid-message and the buffered bytes never parsed.
    #[error("incomplete JSON response received")]
    IncompleteResponse,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the JSON-RPC error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            Error::UnknownTool(_) => codes::METHOD_NOT_FOUND,
            Error::MissingArgument(_) | Error::InvalidArgument { .. } => codes::INVALID_PARAMS,
            Error::NoSession => -32000,
            Error::UnsupportedPlatform => -32000,
            Error::Driver(_) => -32001,
            Error::ConnectionClosed | Error::IncompleteResponse | Error::Io(_) => -32002,
            Error::Serialization(_) => codes::PARSE_ERROR,
        }
    }

    /// Whether this is a connection-level fault (as opposed to a
    /// command-level error). Only connection faults are eligible for the
    /// connector's reconnect-and-retry.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Io(_) | Error::ConnectionClosed)
    }
}

/// Standard JSON-RPC error codes.
pub mod codes {
    /// Parse error.
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid request.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params.
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error.
    pub const INTERNAL_ERROR: i32 = -32603;
}
