//! Destinations for values emitted by the output instruction.

use std::io::{self, Write};

use tracing::debug;

use crate::error::RuntimeError;

pub trait OutputSink {
    /// Deliver one value. An error fails the run at the output instruction.
    fn emit(&mut self, value: i64) -> Result<(), RuntimeError>;
}

/// The line printed for every emitted value.
pub fn diagnostic_line(value: i64) -> String {
    format!("Diagnostic code:  {}", value)
}

/// Writes one [`diagnostic_line`] per value to a writer.
pub struct DiagnosticWriter<W: Write> {
    out: W,
}

impl<W: Write> DiagnosticWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl DiagnosticWriter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> OutputSink for DiagnosticWriter<W> {
    fn emit(&mut self, value: i64) -> Result<(), RuntimeError> {
        writeln!(self.out, "{}", diagnostic_line(value)).map_err(output_error)?;
        self.out.flush().map_err(output_error)
    }
}

fn output_error(err: io::Error) -> RuntimeError {
    RuntimeError::Output(err.to_string())
}

/// Drops every value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl OutputSink for Discard {
    fn emit(&mut self, _value: i64) -> Result<(), RuntimeError> {
        Ok(())
    }
}

impl OutputSink for Vec<i64> {
    fn emit(&mut self, value: i64) -> Result<(), RuntimeError> {
        self.push(value);
        Ok(())
    }
}

impl<F: FnMut(i64)> OutputSink for F {
    fn emit(&mut self, value: i64) -> Result<(), RuntimeError> {
        self(value);
        Ok(())
    }
}

/// Forwards to an inner sink while keeping a copy of every value.
pub struct Tee<O> {
    inner: O,
    seen: Vec<i64>,
}

impl<O: OutputSink> Tee<O> {
    pub fn new(inner: O) -> Self {
        Self { inner, seen: Vec::new() }
    }

    pub fn seen(&self) -> &[i64] {
        &self.seen
    }

    pub fn into_parts(self) -> (O, Vec<i64>) {
        (self.inner, self.seen)
    }
}

impl<O: OutputSink> OutputSink for Tee<O> {
    fn emit(&mut self, value: i64) -> Result<(), RuntimeError> {
        debug!(value, "output");
        self.seen.push(value);
        self.inner.emit(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_uses_the_two_space_format() {
        let mut sink = DiagnosticWriter::new(Vec::<u8>::new());
        sink.emit(1).unwrap();
        sink.emit(-42).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "Diagnostic code:  1\nDiagnostic code:  -42\n");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn writer_failure_is_reported() {
        let mut sink = DiagnosticWriter::new(BrokenPipe);
        assert!(matches!(sink.emit(7), Err(RuntimeError::Output(_))));
    }

    #[test]
    fn closures_are_sinks() {
        let mut total = 0;
        {
            let mut sink = |v: i64| total += v;
            sink.emit(3).unwrap();
            sink.emit(4).unwrap();
        }
        assert_eq!(total, 7);
    }

    #[test]
    fn tee_records_and_forwards() {
        let mut tee = Tee::new(Vec::<i64>::new());
        tee.emit(5).unwrap();
        tee.emit(6).unwrap();
        assert_eq!(tee.seen(), &[5, 6]);
        let (inner, seen) = tee.into_parts();
        assert_eq!(inner, seen);
    }
}
