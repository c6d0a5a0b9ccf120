//! Structured error detail carried in the `err` key of a record

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

/// Normalized error passed to a log call.
///
/// Serializes as `{message, name, code?, stack}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub stack: String,
}

impl ErrorInfo {
    /// Create an error detail with a default single-frame stack.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        let message = message.into();
        let stack = format!("{}: {}", name, message);
        Self {
            message,
            name,
            code: None,
            stack,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }

    /// Build from a Rust error; the name is the error's type name.
    ///
    /// The stack lists the error followed by its `source()` chain.
    pub fn from_error<E: StdError>(err: &E) -> Self {
        let name = short_type_name(std::any::type_name::<E>());
        Self::from_parts(name, err)
    }

    /// Build from a type-erased error, named `Error`.
    pub fn from_dyn(err: &(dyn StdError + 'static)) -> Self {
        Self::from_parts("Error".to_string(), err)
    }

    fn from_parts(name: String, err: &dyn StdError) -> Self {
        let message = err.to_string();
        let mut stack = format!("{}: {}", name, message);
        let mut source = err.source();
        while let Some(cause) = source {
            stack.push_str("\n    caused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            message,
            name,
            code: None,
            stack,
        }
    }

    /// Record message for this error: `"{code}: {message}"` or `message`.
    pub fn display_message(&self) -> String {
        match &self.code {
            Some(code) => format!("{}: {}", code, self.message),
            None => self.message.clone(),
        }
    }
}

/// `alloc::string::FromUtf8Error` -> `FromUtf8Error`, generics dropped.
fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
