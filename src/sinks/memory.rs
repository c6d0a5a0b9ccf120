//! In-memory sink, mostly for tests and inspection

use crate::core::{LoggerError, Result, Sink};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// Collects every line written to it.
///
/// Clones share the same buffer, so a clone can be attached to a logger while
/// another handle is kept for reading.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, as UTF-8 (lossy).
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Written lines without their terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Written lines parsed as JSON; unparsable lines are skipped.
    pub fn records(&self) -> Vec<Value> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }

    /// Parse every line as a record, failing on the first bad line.
    pub fn try_records(&self) -> Result<Vec<Value>> {
        self.lines()
            .iter()
            .map(|line| serde_json::from_str(line).map_err(LoggerError::from))
            .collect()
    }
}

impl Sink for MemorySink {
    fn write(&mut self, line: &[u8]) -> Result<()> {
        self.buffer.lock().extend_from_slice(line);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
