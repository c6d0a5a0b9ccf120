//! Sink implementations

pub mod memory;
pub mod writer;

#[cfg(feature = "console")]
pub mod console;
#[cfg(feature = "file")]
pub mod file;

pub use memory::MemorySink;
pub use writer::WriterSink;

#[cfg(feature = "console")]
pub use console::{ConsoleFormat, ConsoleSink};
#[cfg(feature = "file")]
pub use file::FileSink;

pub use crate::core::Sink;
