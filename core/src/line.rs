//! Assembles newline-terminated text lines from a byte stream (the UART).

use heapless::Vec;

#[derive(Debug, PartialEq, Eq)]
pub enum LineEvent<'a> {
    /// No complete line yet.
    Pending,
    /// A full line without its terminator (`\n` or `\r\n`).
    Line(&'a str),
    /// The line was longer than the buffer and has been dropped.
    Overflow,
    NotUtf8,
}

pub struct LineBuffer<const N: usize> {
    buf: Vec<u8, N>,
    discarding: bool,
    ready: bool,
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineBuffer<N> {
    pub const fn new() -> Self {
        LineBuffer {
            buf: Vec::new(),
            discarding: false,
            ready: false,
        }
    }

    pub fn push(&mut self, byte: u8) -> LineEvent<'_> {
        if self.ready {
            self.buf.clear();
            self.ready = false;
        }

        if byte == b'\n' {
            if self.discarding {
                self.discarding = false;
                return LineEvent::Overflow;
            }
            self.ready = true;
            return match core::str::from_utf8(&self.buf) {
                Ok(line) => LineEvent::Line(line.strip_suffix('\r').unwrap_or(line)),
                Err(_) => LineEvent::NotUtf8,
            };
        }

        if !self.discarding && self.buf.push(byte).is_err() {
            self.discarding = true;
            self.buf.clear();
        }
        LineEvent::Pending
    }
}
