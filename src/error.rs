use std::io;
use thiserror::Error;

/// Everything that can go wrong between dequeuing a candidate name and
/// obtaining its parsed response. All variants lead to the same default
/// behavior (the candidate is silently dropped), but they are kept apart
/// so debug logging can tell a refused connection from a garbled reply.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connect failed: {0}")]
    Connect(#[source] io::Error),

    #[error("connect timed out")]
    ConnectTimeout,

    #[error("TLS handshake failed: {0}")]
    Tls(String),

    #[error("request send failed: {0}")]
    Send(#[source] io::Error),

    #[error("response read failed: {0}")]
    Receive(#[source] io::Error),

    #[error("operation timed out")]
    Timeout,

    #[error("malformed response: {reason}")]
    Malformed { reason: String },
}

impl ProbeError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        ProbeError::Malformed {
            reason: reason.into(),
        }
    }

    /// Short stable label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::Connect(_) => "connect",
            ProbeError::ConnectTimeout => "connect-timeout",
            ProbeError::Tls(_) => "tls",
            ProbeError::Send(_) => "send",
            ProbeError::Receive(_) => "receive",
            ProbeError::Timeout => "timeout",
            ProbeError::Malformed { .. } => "malformed",
        }
    }
}
