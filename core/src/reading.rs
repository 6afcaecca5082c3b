//! The single transient entity: one heart-rate sample.

use core::fmt::Write;

use heapless::String;

/// Largest body [`Reading::json_body`] can produce.
///
/// `{"heartRate":}` is 14 bytes and the longest `f32` debug rendering
/// (`-1.17549435e-38`) is 15, so 48 leaves plenty of room.
pub const BODY_CAPACITY: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingError {
    /// Input was not a decimal number.
    NotANumber,
    /// NaN or infinity.
    NotFinite,
}

/// A heart-rate measurement as handed over by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    heart_rate: f32,
}

impl Reading {
    pub fn new(heart_rate: f32) -> Result<Self, ReadingError> {
        if !heart_rate.is_finite() {
            return Err(ReadingError::NotFinite);
        }
        Ok(Reading { heart_rate })
    }

    /// Parse a reading from one line of text such as `72.5` or ` 64 `.
    pub fn parse(text: &str) -> Result<Self, ReadingError> {
        let value: f32 = text
            .trim()
            .parse()
            .map_err(|_| ReadingError::NotANumber)?;
        Reading::new(value)
    }

    pub fn heart_rate(&self) -> f32 {
        self.heart_rate
    }

    /// Encode as `{"heartRate":<value>}`.
    ///
    /// The value uses the shortest representation that round-trips to the
    /// same `f32` and always carries a decimal point or exponent, so `0`
    /// renders as `0.0` and `72.5` as `72.5`.
    pub fn json_body(&self) -> String<BODY_CAPACITY> {
        let mut body: String<BODY_CAPACITY> = String::new();
        // Cannot overflow, see BODY_CAPACITY.
        let _ = write!(body, "{{\"heartRate\":{:?}}}", self.heart_rate);
        body
    }
}
