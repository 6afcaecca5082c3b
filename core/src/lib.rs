//! Platform-agnostic core of the heart-rate transmitter.
//!
//! Everything in here is hardware free so it can be tested on the host:
//! reading validation and JSON encoding, endpoint and configuration parsing,
//! the HTTP/1.1 exchange over any `embedded-io-async` stream, and the
//! [`Transmitter`] that ties them together behind the [`Transport`] port.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod line;
pub mod reading;
pub mod transmitter;

pub use config::Config;
pub use endpoint::Endpoint;
pub use error::{ProtocolError, SendError, TransportError};
pub use reading::Reading;
pub use transmitter::{Delivery, Transmitter, Transport};
