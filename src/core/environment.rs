//! Environmental decorations for records: time, host and pid
//!
//! The core never looks these up itself; it asks the registry's
//! [`Environment`].

use chrono::{DateTime, Utc};

pub trait Environment: Send + Sync {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn host(&self) -> &str;

    fn pid(&self) -> u32;
}

/// The running process: wall clock, machine hostname, process id.
#[derive(Debug, Clone)]
pub struct SystemEnvironment {
    host: String,
    pid: u32,
}

impl SystemEnvironment {
    pub fn new() -> Self {
        let host = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "localhost".to_string());
        Self {
            host,
            pid: std::process::id(),
        }
    }
}

impl Default for SystemEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SystemEnvironment {
    fn host(&self) -> &str {
        &self.host
    }

    fn pid(&self) -> u32 {
        self.pid
    }
}

/// Constant decorations, for reproducible output.
///
/// # Example
///
/// ```
/// use treelog::{Environment, FixedEnvironment};
///
/// let env = FixedEnvironment::new("matt", 42);
/// assert_eq!(env.host(), "matt");
/// assert_eq!(env.now().to_rfc3339(), "2024-01-01T00:00:00+00:00");
/// ```
#[derive(Debug, Clone)]
pub struct FixedEnvironment {
    time: DateTime<Utc>,
    host: String,
    pid: u32,
}

impl FixedEnvironment {
    /// Fixed at `2024-01-01T00:00:00Z`.
    pub fn new(host: impl Into<String>, pid: u32) -> Self {
        Self {
            time: DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::seconds(1_704_067_200),
            host: host.into(),
            pid,
        }
    }

    /// Report `time` instead of the default instant.
    #[must_use]
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }
}

impl Environment for FixedEnvironment {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn pid(&self) -> u32 {
        self.pid
    }
}
