//! Destinations for encoded request bodies.
//!
//! A [`Sink`] receives one request body per call: a single line in
//! per-point mode, or all lines joined by `\n` in bulk mode. The encoder
//! never knows where its output goes; the same [`Batch`](crate::Batch) can be
//! returned to the caller through a [`MemorySink`], printed through an
//! [`IoSink`], or POSTed through an `HttpSink` (feature `http-write`).

use std::io;

use crate::error::TransportError;

/// Acknowledgement of an accepted body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivered {
    /// The HTTP status the endpoint answered with, if the sink speaks HTTP.
    pub status: Option<u16>,
}

/// Capability to deliver one request body.
pub trait Sink {
    /// Delivers `body`, which holds `lines` line-protocol lines.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the body was not accepted.
    fn send(&mut self, body: &str, lines: usize) -> Result<Delivered, TransportError>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn send(&mut self, body: &str, lines: usize) -> Result<Delivered, TransportError> {
        (**self).send(body, lines)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn send(&mut self, body: &str, lines: usize) -> Result<Delivered, TransportError> {
        (**self).send(body, lines)
    }
}

/// Collects request bodies in memory, returning them to the caller.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    bodies: Vec<String>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bodies received so far, in delivery order.
    pub fn bodies(&self) -> &[String] {
        &self.bodies
    }

    /// Consumes the sink, returning the received bodies.
    pub fn into_bodies(self) -> Vec<String> {
        self.bodies
    }
}

impl Sink for MemorySink {
    fn send(&mut self, body: &str, _lines: usize) -> Result<Delivered, TransportError> {
        self.bodies.push(body.to_string());
        Ok(Delivered::default())
    }
}

/// Writes each body, newline-terminated, to an [`io::Write`].
#[derive(Debug)]
pub struct IoSink<W> {
    writer: W,
}

impl<W: io::Write> IoSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> Sink for IoSink<W> {
    fn send(&mut self, body: &str, _lines: usize) -> Result<Delivered, TransportError> {
        writeln!(self.writer, "{body}")
            .and_then(|()| self.writer.flush())
            .map(|()| Delivered::default())
            .map_err(|e| TransportError::Unavailable {
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        sink.send("a v=1i", 1).unwrap();
        sink.send("b v=2i\nc v=3i", 2).unwrap();

        assert_eq!(sink.bodies(), ["a v=1i", "b v=2i\nc v=3i"]);
    }

    #[test]
    fn test_io_sink_terminates_bodies() {
        let mut sink = IoSink::new(Vec::new());
        sink.send("a v=1i", 1).unwrap();
        sink.send("b v=2i", 1).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "a v=1i\nb v=2i\n");
    }

    #[test]
    fn test_sink_through_mut_ref() {
        fn deliver(mut sink: impl Sink) {
            sink.send("x v=1i", 1).unwrap();
        }

        let mut sink = MemorySink::new();
        deliver(&mut sink);
        assert_eq!(sink.bodies().len(), 1);
    }
}
