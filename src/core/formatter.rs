//! Turns a variadic log call into a message, fields and error detail
//!
//! Pure and deterministic. The first argument decides the form of the call:
//!
//! - an object: its `message` key is the message, every other key a field
//! - an error: message `"{code}: {message}"`, plus an `err` block
//! - a string: printf-style template (`%s %d %i %f %j %o %O %%`), returned
//!   untouched when nothing follows it
//! - any other primitive: the message verbatim; undefined yields none
//!
//! Arguments left over once the template is exhausted contribute their keys
//! to the fields when they are objects and are dropped otherwise.

use super::arg::Arg;
use super::error_info::ErrorInfo;
use super::fields::{self, Fields};
use serde_json::Value;

/// Fallback text for a `%j` argument that cannot be serialized.
pub const UNSERIALIZABLE: &str = "[Circular]";

/// Output of [`format`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Formatted {
    /// `None` means the record carries no `message` key at all.
    pub message: Option<Value>,
    /// `None` when no call-site fields were supplied.
    pub fields: Option<Fields>,
    pub err: Option<ErrorInfo>,
}

pub fn format(args: Vec<Arg>) -> Formatted {
    let mut args = args.into_iter();
    let Some(first) = args.next() else {
        return Formatted::default();
    };

    match first {
        Arg::Object(map) => {
            let mut message = None;
            let mut own = Fields::new();
            for (key, value) in map {
                if key == "message" {
                    message = Some(value);
                } else {
                    own.insert(key, value);
                }
            }
            Formatted {
                message,
                fields: harvest(own, args),
                err: None,
            }
        }
        Arg::Error(err) => Formatted {
            message: Some(Value::String(err.display_message())),
            fields: None,
            err: Some(err),
        },
        Arg::Primitive(Value::String(template)) => {
            let message = if args.as_slice().is_empty() {
                template
            } else {
                printf(&template, &mut args)
            };
            Formatted {
                message: Some(Value::String(message)),
                fields: harvest(Fields::new(), args),
                err: None,
            }
        }
        Arg::Primitive(value) => Formatted {
            message: Some(value),
            fields: harvest(Fields::new(), args),
            err: None,
        },
        // JSON has no NaN or infinity; serialized like JSON.stringify would
        Arg::NonFinite(_) => Formatted {
            message: Some(Value::Null),
            fields: harvest(Fields::new(), args),
            err: None,
        },
        Arg::Undefined => Formatted {
            message: None,
            fields: harvest(Fields::new(), args),
            err: None,
        },
    }
}

fn harvest(mut own: Fields, extras: impl Iterator<Item = Arg>) -> Option<Fields> {
    for arg in extras {
        if let Arg::Object(map) = arg {
            fields::extend(&mut own, map);
        }
    }
    if own.is_empty() {
        None
    } else {
        Some(own)
    }
}

/// Substitute directives from `args`; directives without an argument stay verbatim.
fn printf(template: &str, args: &mut impl Iterator<Item = Arg>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(directive @ ('s' | 'd' | 'i' | 'f' | 'j' | 'o' | 'O')) => {
                chars.next();
                match args.next() {
                    Some(arg) => out.push_str(&render(directive, &arg)),
                    None => {
                        out.push('%');
                        out.push(directive);
                    }
                }
            }
            _ => out.push('%'),
        }
    }

    out
}

fn render(directive: char, arg: &Arg) -> String {
    match directive {
        's' => render_string(arg),
        'd' | 'i' | 'f' => render_numeric(directive, arg),
        _ => render_json(arg),
    }
}

fn render_string(arg: &Arg) -> String {
    match arg {
        Arg::Undefined => "undefined".to_string(),
        Arg::Primitive(Value::String(s)) => s.clone(),
        Arg::Primitive(Value::Number(n)) => number_text(n),
        Arg::Primitive(other) => other.to_string(),
        Arg::NonFinite(value) => js_number(*value),
        Arg::Object(map) => {
            serde_json::to_string(map).unwrap_or_else(|_| UNSERIALIZABLE.to_string())
        }
        Arg::Error(err) => format!("{}: {}", err.name, err.message),
    }
}

fn render_numeric(directive: char, arg: &Arg) -> String {
    if let Arg::Primitive(Value::Number(n)) = arg {
        if n.is_i64() || n.is_u64() {
            return n.to_string();
        }
    }
    let value = to_number(arg);
    if directive == 'i' {
        // parseInt semantics: an infinity has no integer reading
        if value.is_finite() {
            js_number(value.trunc())
        } else {
            js_number(f64::NAN)
        }
    } else {
        js_number(value)
    }
}

fn render_json(arg: &Arg) -> String {
    let result = match arg {
        Arg::Undefined => return "undefined".to_string(),
        Arg::NonFinite(_) => return "null".to_string(),
        Arg::Primitive(value) => serde_json::to_string(value),
        Arg::Object(map) => serde_json::to_string(map),
        Arg::Error(err) => serde_json::to_string(err),
    };
    result.unwrap_or_else(|_| UNSERIALIZABLE.to_string())
}

/// Numeric coercion; anything without a numeric reading becomes NaN.
fn to_number(arg: &Arg) -> f64 {
    match arg {
        Arg::Primitive(Value::Null) => 0.0,
        Arg::Primitive(Value::Bool(b)) => f64::from(u8::from(*b)),
        Arg::Primitive(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Arg::NonFinite(value) => *value,
        Arg::Primitive(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        _ => f64::NAN,
    }
}

fn number_text(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        n.to_string()
    } else {
        js_number(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Render like a script runtime would: `1` not `1.0`, `NaN`, `Infinity`.
fn js_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}
