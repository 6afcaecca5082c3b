//! Outcome taxonomy for a single transmission.

use core::fmt;

/// Failures below HTTP: name resolution, TCP and socket I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    DnsResolveFailed,
    ConnectionFailed,
    Timeout,
    Io,
}

/// Failures while negotiating TLS or speaking HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    TlsHandshake,
    RequestTooLarge,
    /// A header value contains CR, LF or another control character.
    InvalidHeaderValue,
    MalformedResponse,
    /// The peer closed the stream before a complete status line arrived.
    ConnectionClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// NaN or infinite value; nothing was sent.
    InvalidReading,
    Transport(TransportError),
    Protocol(ProtocolError),
    /// The server answered with a non-2xx status code.
    RejectedByServer(u16),
}

impl From<TransportError> for SendError {
    fn from(e: TransportError) -> Self {
        SendError::Transport(e)
    }
}

impl From<ProtocolError> for SendError {
    fn from(e: ProtocolError) -> Self {
        SendError::Protocol(e)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DnsResolveFailed => write!(f, "DNS resolution failed"),
            Self::ConnectionFailed => write!(f, "connection failed"),
            Self::Timeout => write!(f, "timed out"),
            Self::Io => write!(f, "socket I/O error"),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TlsHandshake => write!(f, "TLS handshake failed"),
            Self::RequestTooLarge => write!(f, "request does not fit the buffer"),
            Self::InvalidHeaderValue => write!(f, "header value contains control characters"),
            Self::MalformedResponse => write!(f, "malformed HTTP response"),
            Self::ConnectionClosed => write!(f, "connection closed before response"),
        }
    }
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidReading => write!(f, "reading is not a finite number"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::Protocol(e) => write!(f, "protocol error: {e}"),
            Self::RejectedByServer(status) => write!(f, "rejected by server with status {status}"),
        }
    }
}

impl core::error::Error for TransportError {}
impl core::error::Error for ProtocolError {}
impl core::error::Error for SendError {}
