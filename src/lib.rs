//! # treelog
//!
//! Hierarchical, namespace-scoped structured logging.
//!
//! Loggers are nodes of a namespace tree (`"lb:lc"` is a child of `"lb"`).
//! A log call formats its arguments printf-style, merges the fields of every
//! ancestor, and writes one JSON line to each sink subscribed on the node or
//! any ancestor.
//!
//! ## Features
//!
//! - **One node per namespace**: every lookup of a path returns the same node
//! - **Severity views**: subscribe to `warn` and above, anywhere in the tree
//! - **Inherited fields**: context added on a parent shows up in its children
//! - **Smart formatting**: `%s %d %j` substitution, trailing objects as fields
//!
//! ```
//! use treelog::prelude::*;
//! use serde_json::json;
//!
//! let registry = Registry::builder()
//!     .environment(FixedEnvironment::new("host", 1))
//!     .build();
//! let warnings = MemorySink::new();
//!
//! let api = registry.logger("api");
//! registry.root().severity(LogLevel::Warn).attach_sink(warnings.clone());
//! api.add_field("region", "eu");
//!
//! api.info("started");
//! api.warn(("slow request: %dms", 1200, json!({"path": "/users"})));
//!
//! let records = warnings.records();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0]["message"], json!("slow request: 1200ms"));
//! assert_eq!(records[0]["fields"], json!({"region": "eu", "path": "/users"}));
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub use serde_json;

pub mod prelude {
    pub use crate::core::{
        Arg, Environment, ErrorInfo, Fields, FixedEnvironment, IntoArgs, LevelView, LogLevel,
        Logger, LoggerError, Registry, Result, Sink, SystemEnvironment,
    };
    pub use crate::sinks::{MemorySink, WriterSink};
    #[cfg(feature = "console")]
    pub use crate::sinks::ConsoleSink;
    #[cfg(feature = "file")]
    pub use crate::sinks::FileSink;
}

pub use crate::core::{
    format, split_namespace, Arg, Environment, ErrorInfo, Fields, FixedEnvironment,
    ForwardedRecord, Formatted, IntoArgs, LevelView, LogLevel, Logger, LoggerError, Record,
    Registry, RegistryBuilder, RegistryMetrics, Result, Sink, SystemEnvironment,
    DEFAULT_ROOT_NAME, SEPARATOR,
};
pub use sinks::{MemorySink, WriterSink};

/// Resolve a namespace on the process-wide registry.
pub fn logger(namespace: &str) -> Logger {
    Registry::global().logger(namespace)
}

/// Root logger of the process-wide registry.
pub fn root() -> Logger {
    Registry::global().root()
}

/// Reset the process-wide registry to a lone root with no sinks or fields.
pub fn reset() {
    Registry::global().reset();
}
