//! Log records and their JSON line encoding

use super::error::{LoggerError, Result};
use super::error_info::ErrorInfo;
use super::fields::Fields;
use super::log_level::LogLevel;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// One emitted log event.
///
/// Serializes with the key order `time, level, name, message?, fields?,
/// err?, host, pid`. An absent `message` is omitted, a null one is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(serialize_with = "serialize_time")]
    pub time: DateTime<Utc>,
    pub level: LogLevel,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Fields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<ErrorInfo>,
    pub host: String,
    pub pid: u32,
}

impl Record {
    /// Encode as a single newline-terminated JSON line.
    pub fn to_line(&self) -> Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }

    /// Parse one JSON line.
    pub fn from_line(line: &str) -> Result<Self> {
        serde_json::from_str(line.trim_end()).map_err(LoggerError::from)
    }
}

/// ISO-8601 UTC with milliseconds: `2024-01-01T00:00:00.000Z`.
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_time<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_time(time))
}

/// Distinguishes an explicit `null` from a missing key.
fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A record built elsewhere, routed into a tree without field inheritance.
///
/// `time`, `host` and `pid` are re-decorated on arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardedRecord {
    pub level: LogLevel,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Fields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<ErrorInfo>,
}

impl ForwardedRecord {
    pub fn new(level: LogLevel, name: impl Into<String>) -> Self {
        Self {
            level,
            name: name.into(),
            message: None,
            fields: None,
            err: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<Value>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = if fields.is_empty() { None } else { Some(fields) };
        self
    }

    #[must_use]
    pub fn with_err(mut self, err: ErrorInfo) -> Self {
        self.err = Some(err);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(message: Option<Value>) -> Record {
        Record {
            time: DateTime::<Utc>::UNIX_EPOCH,
            level: LogLevel::Info,
            name: "a".to_string(),
            message,
            fields: None,
            err: None,
            host: "matt".to_string(),
            pid: 1,
        }
    }

    #[test]
    fn test_line_layout() {
        let line = record(Some(json!("a"))).to_line().unwrap();
        assert_eq!(
            String::from_utf8(line).unwrap(),
            "{\"time\":\"1970-01-01T00:00:00.000Z\",\"level\":\"info\",\"name\":\"a\",\"message\":\"a\",\"host\":\"matt\",\"pid\":1}\n"
        );
    }

    #[test]
    fn test_absent_vs_null_message() {
        let absent = String::from_utf8(record(None).to_line().unwrap()).unwrap();
        assert!(!absent.contains("message"));

        let null = String::from_utf8(record(Some(Value::Null)).to_line().unwrap()).unwrap();
        assert!(null.contains("\"message\":null"));

        assert_eq!(Record::from_line(&null).unwrap().message, Some(Value::Null));
        assert_eq!(Record::from_line(&absent).unwrap().message, None);
    }

    #[test]
    fn test_fields_and_err_placement() {
        let mut r = record(Some(json!("SYNTAX: oh dear")));
        r.fields = json!({"line": 20}).as_object().cloned();
        r.err = Some(ErrorInfo::new("SyntaxError", "oh dear").with_code("SYNTAX"));
        let text = String::from_utf8(r.to_line().unwrap()).unwrap();
        let fields_at = text.find("\"fields\"").unwrap();
        let err_at = text.find("\"err\"").unwrap();
        let host_at = text.find("\"host\"").unwrap();
        assert!(fields_at < err_at && err_at < host_at);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_forwarded_record_parse() {
        let fwd: ForwardedRecord =
            serde_json::from_str(r#"{"level":"warn","name":"root:a","message":null}"#).unwrap();
        assert_eq!(fwd.level, LogLevel::Warn);
        assert_eq!(fwd.message, Some(Value::Null));
        assert!(fwd.fields.is_none());
    }
}
