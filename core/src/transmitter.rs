//! Reading transmitter: validate, encode, POST, classify the status.

use core::future::Future;

use log::{info, warn};

use crate::endpoint::Endpoint;
use crate::error::SendError;
use crate::http::Request;
use crate::reading::Reading;

/// Port to whatever carries a request to the server.
///
/// An implementation opens a fresh connection per call, performs the
/// exchange and tears the connection down before returning, whatever the
/// outcome.
pub trait Transport {
    /// Deliver `request` and return the HTTP status code the server answered with.
    fn post(&mut self, request: &Request<'_>) -> impl Future<Output = Result<u16, SendError>>;
}

/// A reading the server accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub status: u16,
}

pub struct Transmitter<'a, T> {
    transport: T,
    endpoint: Endpoint<'a>,
    token: &'a str,
}

impl<'a, T: Transport> Transmitter<'a, T> {
    pub fn new(transport: T, endpoint: Endpoint<'a>, token: &'a str) -> Self {
        Transmitter {
            transport,
            endpoint,
            token,
        }
    }

    /// POST one reading as `{"heartRate":<value>}`.
    ///
    /// Non-finite values are refused before any connection is made. Any
    /// status outside 2xx comes back as [`SendError::RejectedByServer`].
    pub async fn send_reading(&mut self, value: f32) -> Result<Delivery, SendError> {
        let reading = Reading::new(value).map_err(|_| SendError::InvalidReading)?;
        let body = reading.json_body();
        let request = Request::post_json(self.endpoint, self.token, body.as_str());

        let status = self.transport.post(&request).await?;
        if (200..300).contains(&status) {
            info!("Reading {} accepted with status {}", reading.heart_rate(), status);
            Ok(Delivery { status })
        } else {
            warn!("Reading {} rejected with status {}", reading.heart_rate(), status);
            Err(SendError::RejectedByServer(status))
        }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProtocolError, TransportError};
    use crate::http::tests::Pipe;
    use crate::http::{Method, exchange};
    use embassy_futures::block_on;

    #[derive(Default)]
    struct Recorded {
        method: Option<Method>,
        host: std::string::String,
        path: std::string::String,
        headers: Vec<(&'static str, std::string::String)>,
        body: std::string::String,
    }

    struct Recording {
        status: Result<u16, SendError>,
        calls: usize,
        last: Recorded,
    }

    impl Recording {
        fn answering(status: Result<u16, SendError>) -> Self {
            Recording {
                status,
                calls: 0,
                last: Recorded::default(),
            }
        }
    }

    impl Transport for Recording {
        async fn post(&mut self, request: &Request<'_>) -> Result<u16, SendError> {
            self.calls += 1;
            self.last = Recorded {
                method: Some(request.method),
                host: request.endpoint.host.into(),
                path: request.endpoint.path.into(),
                headers: request
                    .headers
                    .iter()
                    .map(|h| (h.name, h.value.into()))
                    .collect(),
                body: request.body.into(),
            };
            self.status
        }
    }

    /// Runs the real HTTP exchange against a canned response.
    struct Wire {
        response: &'static [u8],
        written: Vec<u8>,
    }

    impl Transport for Wire {
        async fn post(&mut self, request: &Request<'_>) -> Result<u16, SendError> {
            let mut pipe = Pipe::new(self.response);
            let mut rx = [0u8; 128];
            let status = exchange(&mut pipe, request, &mut rx).await;
            self.written = pipe.written;
            status
        }
    }

    fn endpoint() -> Endpoint<'static> {
        Endpoint::parse("https://votre-api.example/api/data").unwrap()
    }

    #[test]
    fn builds_json_post_with_exactly_two_headers() {
        let mut tx = Transmitter::new(Recording::answering(Ok(200)), endpoint(), "jwt-token");
        let delivery = block_on(tx.send_reading(72.5)).unwrap();
        assert_eq!(delivery, Delivery { status: 200 });

        let last = &tx.transport().last;
        assert_eq!(last.method, Some(Method::Post));
        assert_eq!(last.host, "votre-api.example");
        assert_eq!(last.path, "/api/data");
        assert_eq!(last.body, r#"{"heartRate":72.5}"#);
        assert_eq!(
            last.headers,
            vec![
                ("Content-Type", "application/json".to_string()),
                ("Authorization", "jwt-token".to_string()),
            ]
        );
    }

    #[test]
    fn token_is_not_prefixed() {
        let mut tx = Transmitter::new(Recording::answering(Ok(201)), endpoint(), "abc");
        block_on(tx.send_reading(60.0)).unwrap();
        let auth = &tx.transport().last.headers[1];
        assert_eq!(auth.1, "abc");
    }

    #[test]
    fn non_finite_reading_never_reaches_transport() {
        let mut tx = Transmitter::new(Recording::answering(Ok(200)), endpoint(), "t");
        assert_eq!(block_on(tx.send_reading(f32::NAN)), Err(SendError::InvalidReading));
        assert_eq!(block_on(tx.send_reading(f32::INFINITY)), Err(SendError::InvalidReading));
        assert_eq!(tx.transport().calls, 0);
    }

    #[test]
    fn unreachable_transport_is_reported_not_fatal() {
        let unreachable = SendError::Transport(TransportError::ConnectionFailed);
        let mut tx = Transmitter::new(Recording::answering(Err(unreachable)), endpoint(), "t");
        assert_eq!(block_on(tx.send_reading(72.5)), Err(unreachable));
        // Still usable afterwards.
        assert_eq!(block_on(tx.send_reading(73.0)), Err(unreachable));
        assert_eq!(tx.transport().calls, 2);
    }

    #[test]
    fn handshake_failure_is_a_protocol_error() {
        let failed = SendError::Protocol(ProtocolError::TlsHandshake);
        let mut tx = Transmitter::new(Recording::answering(Err(failed)), endpoint(), "t");
        assert_eq!(block_on(tx.send_reading(72.5)), Err(failed));
    }

    #[test]
    fn non_2xx_is_rejection_with_code() {
        for code in [301, 400, 401, 404, 500] {
            let mut tx = Transmitter::new(Recording::answering(Ok(code)), endpoint(), "t");
            assert_eq!(
                block_on(tx.send_reading(72.5)),
                Err(SendError::RejectedByServer(code))
            );
        }
    }

    #[test]
    fn end_to_end_over_http() {
        let wire = Wire {
            response: b"HTTP/1.1 201 Created\r\nContent-Type: application/json\r\n\r\n{}",
            written: Vec::new(),
        };
        let mut tx = Transmitter::new(wire, endpoint(), "jwt");
        assert_eq!(block_on(tx.send_reading(0.0)), Ok(Delivery { status: 201 }));

        let written = core::str::from_utf8(&tx.transport().written).unwrap();
        assert_eq!(
            written,
            "POST /api/data HTTP/1.1\r\n\
             Host: votre-api.example\r\n\
             Content-Type: application/json\r\n\
             Authorization: jwt\r\n\
             Content-Length: 17\r\n\
             Connection: close\r\n\r\n\
             {\"heartRate\":0.0}"
        );
        assert_eq!(written.matches("Content-Type:").count(), 1);
        assert_eq!(written.matches("Authorization:").count(), 1);
    }
}
