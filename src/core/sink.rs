//! Sink trait for serialized record streams

use super::error::Result;

/// Consumer of serialized records.
///
/// Each `write` receives exactly one newline-terminated JSON line. Buffering
/// is the sink's own business; the core only hands over the bytes.
///
/// `write` runs under the registry lock. Log calls it makes into the same
/// registry are dropped (see [`RegistryMetrics::records_dropped`]); other
/// registry operations from inside `write` panic and count as a sink failure.
///
/// [`RegistryMetrics::records_dropped`]: crate::RegistryMetrics::records_dropped
pub trait Sink: Send {
    fn write(&mut self, line: &[u8]) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

impl Sink for Box<dyn Sink> {
    fn write(&mut self, line: &[u8]) -> Result<()> {
        (**self).write(line)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
