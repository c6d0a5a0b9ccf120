//! Sink over any byte stream

use crate::core::{LoggerError, Result, Sink};
use std::io::{self, Write};

/// Writes lines to any `Write` implementation, unbuffered beyond what the
/// writer itself does.
pub struct WriterSink<W: Write + Send> {
    writer: W,
    name: String,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            name: "writer".to_string(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout()).with_name("stdout")
    }
}

impl WriterSink<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr()).with_name("stderr")
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write(&mut self, line: &[u8]) -> Result<()> {
        self.writer
            .write_all(line)
            .map_err(|e| LoggerError::io_operation("writing record", self.name.clone(), e))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writes_to_vec() {
        let mut sink = WriterSink::new(Vec::new());
        sink.write(b"one\n").unwrap();
        sink.write(b"two\n").unwrap();
        assert_eq!(sink.get_ref().as_slice(), b"one\ntwo\n");
    }

    #[test]
    fn test_write_error_carries_context() {
        let mut sink = WriterSink::new(BrokenPipe).with_name("pipe");
        let err = sink.write(b"x\n").unwrap_err();
        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing record"));
        assert_eq!(sink.name(), "pipe");
    }
}
