//! Logging macros for variadic log calls.
//!
//! Each argument is converted with [`Arg::from`](crate::Arg), so strings,
//! numbers, `serde_json` values, [`Fields`](crate::Fields) and
//! [`ErrorInfo`](crate::ErrorInfo) can be mixed freely.
//!
//! # Examples
//!
//! ```
//! use treelog::prelude::*;
//! use treelog::{fields, info};
//!
//! let registry = Registry::new();
//! let log = registry.logger("server");
//!
//! info!(log, "Server started");
//! info!(log, "listening on %s:%d", "0.0.0.0", 8080);
//! info!(log, "request done", fields! { "status" => 200, "path" => "/" });
//! ```

/// Log at an explicit level.
///
/// # Examples
///
/// ```
/// # use treelog::prelude::*;
/// # let log = Registry::new().root();
/// use treelog::log;
/// log!(log, LogLevel::Info, "Simple message");
/// log!(log, LogLevel::Error, "Error code: %d", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr $(, $arg:expr)* $(,)?) => {{
        let args: ::std::vec::Vec<$crate::Arg> = ::std::vec![$($crate::Arg::from($arg)),*];
        $logger.log($level, args)
    }};
}

/// Log a debug-level record.
#[macro_export]
macro_rules! debug {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Debug $(, $arg)*)
    };
}

/// Log an info-level record.
#[macro_export]
macro_rules! info {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Info $(, $arg)*)
    };
}

/// Log a warn-level record.
#[macro_export]
macro_rules! warn {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Warn $(, $arg)*)
    };
}

/// Log an error-level record.
///
/// # Examples
///
/// ```
/// # use treelog::prelude::*;
/// # let log = Registry::new().root();
/// use treelog::error;
/// let failure = ErrorInfo::new("SyntaxError", "oh dear").with_code("SYNTAX");
/// error!(log, failure);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Error $(, $arg)*)
    };
}

/// Log a fatal-level record.
#[macro_export]
macro_rules! fatal {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Fatal $(, $arg)*)
    };
}

/// Build [`Fields`](crate::Fields) from `key => value` pairs.
///
/// # Examples
///
/// ```
/// use treelog::fields;
///
/// let f = fields! { "team" => "soloists", "line" => 15 };
/// assert_eq!(f.len(), 2);
/// assert!(fields! {}.is_empty());
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(
            fields.insert(
                ::std::string::String::from($key),
                $crate::serde_json::Value::from($value),
            );
        )+
        fields
    }};
}

#[cfg(test)]
mod tests {
    use crate::core::{FixedEnvironment, LogLevel, Registry};
    use crate::sinks::MemorySink;
    use serde_json::json;

    fn setup() -> (Registry, MemorySink) {
        let registry = Registry::builder()
            .environment(FixedEnvironment::new("matt", 1))
            .build();
        let sink = MemorySink::new();
        registry.root().attach_sink(sink.clone());
        (registry, sink)
    }

    #[test]
    fn test_log_macro() {
        let (registry, sink) = setup();
        let log = registry.root();
        log!(log, LogLevel::Info, "Formatted: %d", 42);
        assert_eq!(sink.records()[0]["message"], json!("Formatted: 42"));
    }

    #[test]
    fn test_level_macros() {
        let (registry, sink) = setup();
        let log = registry.logger("m");
        debug!(log, "d");
        info!(log, "i");
        warn!(log, "w");
        error!(log, "e");
        fatal!(log, "f");
        let levels: Vec<_> = sink.records().iter().map(|r| r["level"].clone()).collect();
        assert_eq!(
            levels,
            vec![json!("debug"), json!("info"), json!("warn"), json!("error"), json!("fatal")]
        );
    }

    #[test]
    fn test_macro_with_fields_and_undefined() {
        let (registry, sink) = setup();
        let log = registry.logger("m");
        info!(log, "%s %s", "a", crate::Arg::Undefined, fields! { "k" => true });
        let record = &sink.records()[0];
        assert_eq!(record["message"], json!("a undefined"));
        assert_eq!(record["fields"], json!({"k": true}));
    }

    #[test]
    fn test_empty_macro_call_has_no_message() {
        let (registry, sink) = setup();
        let log = registry.logger("m");
        info!(log);
        assert!(sink.records()[0].get("message").is_none());
    }

    #[test]
    fn test_fields_macro() {
        let f = fields! { "a" => 1, "b" => "two", "c" => json!([3]) };
        assert_eq!(serde_json::Value::Object(f), json!({"a": 1, "b": "two", "c": [3]}));
    }
}
