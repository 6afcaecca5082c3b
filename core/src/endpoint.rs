//! Target URL, split into the parts the socket and the request line need.

pub const HTTPS_PORT: u16 = 443;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointError {
    /// Only `https://` URLs are accepted.
    UnsupportedScheme,
    MissingHost,
    InvalidPort,
    /// A query string without a leading path, e.g. `https://host?x`.
    MissingPath,
}

/// `https://host[:port][/path]`, borrowed from the configuration text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
    pub host: &'a str,
    pub port: u16,
    /// Request target including any query string; never empty.
    pub path: &'a str,
}

impl<'a> Endpoint<'a> {
    /// Any `#fragment` is dropped; it is never sent to the server.
    pub fn parse(url: &'a str) -> Result<Self, EndpointError> {
        let url = url.split_once('#').map_or(url, |(before, _)| before);
        let (scheme, rest) = url.split_once("://").ok_or(EndpointError::UnsupportedScheme)?;
        if !scheme.eq_ignore_ascii_case("https") {
            return Err(EndpointError::UnsupportedScheme);
        }

        let (authority, path) = match rest.find(['/', '?']) {
            Some(idx) if rest.as_bytes()[idx] == b'/' => (&rest[..idx], &rest[idx..]),
            Some(_) => return Err(EndpointError::MissingPath),
            None => (rest, "/"),
        };

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port: u16 = port.parse().map_err(|_| EndpointError::InvalidPort)?;
                if port == 0 {
                    return Err(EndpointError::InvalidPort);
                }
                (host, port)
            }
            None => (authority, HTTPS_PORT),
        };

        if host.is_empty() || host.contains(['@', '[', ']', ' ']) {
            return Err(EndpointError::MissingHost);
        }

        Ok(Endpoint { host, port, path })
    }
}
