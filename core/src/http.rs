//! Just enough HTTP/1.1 to POST one JSON body and read back the status code.
//!
//! The request is written in one go to any `embedded-io-async` stream (the
//! TLS session on target, an in-memory pipe in tests). Only the status line
//! of the response is parsed; headers and body are left unread because the
//! connection is closed right after.

use core::fmt::Write as _;

use embedded_io_async::{ErrorKind, Read, Write};
use heapless::String;
use log::debug;

use crate::endpoint::Endpoint;
use crate::error::{ProtocolError, SendError, TransportError};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";
pub const APPLICATION_JSON: &str = "application/json";

/// Request line plus all headers.
pub const HEAD_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<'a> {
    pub name: &'static str,
    pub value: &'a str,
}

/// An application-level request.
///
/// `headers` holds only what the caller asked for. `Host`, `Content-Length`
/// and `Connection` are framing and are added by [`encode_head`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    pub method: Method,
    pub endpoint: Endpoint<'a>,
    pub headers: [Header<'a>; 2],
    pub body: &'a str,
}

impl<'a> Request<'a> {
    /// JSON POST with the token placed verbatim in `Authorization`.
    pub fn post_json(endpoint: Endpoint<'a>, token: &'a str, body: &'a str) -> Self {
        Request {
            method: Method::Post,
            endpoint,
            headers: [
                Header {
                    name: CONTENT_TYPE,
                    value: APPLICATION_JSON,
                },
                Header {
                    name: AUTHORIZATION,
                    value: token,
                },
            ],
            body,
        }
    }
}

fn check_value(value: &str) -> Result<(), ProtocolError> {
    if value.bytes().any(|b| b.is_ascii_control() && b != b'\t') {
        return Err(ProtocolError::InvalidHeaderValue);
    }
    Ok(())
}

/// Render the request line and headers, ending with the blank line.
pub fn encode_head(request: &Request<'_>) -> Result<String<HEAD_CAPACITY>, ProtocolError> {
    let ep = &request.endpoint;
    check_value(ep.host)?;
    check_value(ep.path)?;
    for header in &request.headers {
        check_value(header.value)?;
    }

    let mut head: String<HEAD_CAPACITY> = String::new();
    let mut render = || -> core::fmt::Result {
        write!(head, "{} {} HTTP/1.1\r\n", request.method.as_str(), ep.path)?;
        if ep.port == crate::endpoint::HTTPS_PORT {
            write!(head, "Host: {}\r\n", ep.host)?;
        } else {
            write!(head, "Host: {}:{}\r\n", ep.host, ep.port)?;
        }
        for header in &request.headers {
            write!(head, "{}: {}\r\n", header.name, header.value)?;
        }
        write!(head, "Content-Length: {}\r\n", request.body.len())?;
        write!(head, "Connection: close\r\n\r\n")
    };
    render().map_err(|_| ProtocolError::RequestTooLarge)?;
    Ok(head)
}

/// Extract the code from a line such as `HTTP/1.1 201 Created`.
pub fn parse_status_line(line: &[u8]) -> Result<u16, ProtocolError> {
    let line = core::str::from_utf8(line).map_err(|_| ProtocolError::MalformedResponse)?;
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or("");
    if !matches!(version, "HTTP/1.0" | "HTTP/1.1") {
        return Err(ProtocolError::MalformedResponse);
    }
    let code = parts.next().unwrap_or("");
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtocolError::MalformedResponse);
    }
    let status: u16 = code.parse().map_err(|_| ProtocolError::MalformedResponse)?;
    if !(100..=599).contains(&status) {
        return Err(ProtocolError::MalformedResponse);
    }
    Ok(status)
}

fn io_error<E: embedded_io_async::Error>(e: E) -> SendError {
    match e.kind() {
        ErrorKind::TimedOut => TransportError::Timeout.into(),
        _ => TransportError::Io.into(),
    }
}

/// Send `request` over `conn` and return the response status code.
///
/// `rx` only has to hold the status line; anything read past it is ignored.
pub async fn exchange<C>(conn: &mut C, request: &Request<'_>, rx: &mut [u8]) -> Result<u16, SendError>
where
    C: Read + Write,
{
    let head = encode_head(request)?;
    conn.write_all(head.as_bytes()).await.map_err(io_error)?;
    conn.write_all(request.body.as_bytes()).await.map_err(io_error)?;
    conn.flush().await.map_err(io_error)?;
    debug!("Sent {} byte request to {}", head.len() + request.body.len(), request.endpoint.host);

    let mut filled = 0;
    loop {
        if let Some(end) = rx[..filled].windows(2).position(|w| w == b"\r\n") {
            return Ok(parse_status_line(&rx[..end])?);
        }
        if filled == rx.len() {
            return Err(ProtocolError::MalformedResponse.into());
        }
        let n = conn.read(&mut rx[filled..]).await.map_err(io_error)?;
        if n == 0 {
            return Err(ProtocolError::ConnectionClosed.into());
        }
        filled += n;
    }
}
