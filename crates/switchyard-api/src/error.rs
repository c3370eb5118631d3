use thiserror::Error;

/// Top-level error type for the `switchyard-api` crate.
///
/// Covers every failure mode of the device-facing protocols: HTTP transport,
/// REST status codes, XML responses, and interactive console sessions.
/// `switchyard-core` wraps these into its own error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The switch answered with a non-2xx status.
    #[error("HTTP {status} from {url}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Socket-level failure on a console connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A console read did not see the expected pattern in time.
    #[error("Timed out after {timeout_secs}s waiting for {pattern:?}")]
    Timeout { pattern: String, timeout_secs: u64 },

    /// The device closed the console before the expected pattern appeared.
    #[error("Console closed while waiting for {pattern:?} (pending output: {pending:?})")]
    ConnectionClosed { pattern: String, pending: String },

    // ── Device responses ────────────────────────────────────────────
    /// Malformed XML from the REST API.
    #[error("XML error: {0}")]
    Xml(String),

    /// The device answered with a structurally unexpected response.
    #[error("Unexpected response from switch: {message}")]
    Protocol { message: String },
}

impl Error {
    /// Creates a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Malformed responses are not retryable: the same request would get the
    /// same answer.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_)
            | Self::Http { .. }
            | Self::Io(_)
            | Self::Timeout { .. }
            | Self::ConnectionClosed { .. } => true,
            Self::InvalidUrl(_) | Self::Tls(_) | Self::Xml(_) | Self::Protocol { .. } => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Http { status: 404, .. } => true,
            _ => false,
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}
