//! Routing core: namespace tree, severity views, field merge, formatting

pub mod arg;
pub mod environment;
pub mod error;
pub mod error_info;
pub mod fields;
pub mod formatter;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod registry;
pub mod sink;
pub(crate) mod tree;

pub use arg::{Arg, IntoArgs};
pub use environment::{Environment, FixedEnvironment, SystemEnvironment};
pub use error::{LoggerError, Result};
pub use error_info::ErrorInfo;
pub use fields::Fields;
pub use formatter::{format, Formatted};
pub use log_level::LogLevel;
pub use logger::{LevelView, Logger};
pub use metrics::RegistryMetrics;
pub use record::{ForwardedRecord, Record};
pub use registry::{Registry, RegistryBuilder, DEFAULT_ROOT_NAME};
pub use sink::Sink;
pub use tree::{split_namespace, SEPARATOR};
