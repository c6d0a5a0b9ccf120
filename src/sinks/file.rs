//! File sink implementation

use crate::core::{LoggerError, Result, Sink};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends JSON lines to a file (JSONL).
pub struct FileSink {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation("opening log file", path.display().to_string(), e)
            })?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn write(&mut self, line: &[u8]) -> Result<()> {
        self.writer.write_all(line).map_err(|e| {
            LoggerError::io_operation("writing record", self.path.display().to_string(), e)
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // Buffered lines must reach the disk even when the tree is reset
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_appends() -> Result<()> {
        let dir = tempdir()?;
        let log_path = dir.path().join("test.jsonl");

        let mut sink = FileSink::new(&log_path)?;
        sink.write(b"{\"n\":1}\n")?;
        sink.write(b"{\"n\":2}\n")?;
        sink.flush()?;

        let content = fs::read_to_string(&log_path)?;
        assert_eq!(content, "{\"n\":1}\n{\"n\":2}\n");
        Ok(())
    }

    #[test]
    fn test_drop_flushes() -> Result<()> {
        let dir = tempdir()?;
        let log_path = dir.path().join("dropped.jsonl");

        {
            let mut sink = FileSink::new(&log_path)?;
            sink.write(b"{}\n")?;
        }

        assert_eq!(fs::read_to_string(&log_path)?, "{}\n");
        Ok(())
    }

    #[test]
    fn test_open_error_names_path() {
        let err = FileSink::new("/nonexistent-dir/for/sure/app.log").err().unwrap();
        assert!(err.to_string().contains("opening log file"));
    }
}
