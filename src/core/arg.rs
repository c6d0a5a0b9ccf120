//! Arguments of a log call
//!
//! Every argument is classified once, when it is converted into an [`Arg`].
//! The formatter then dispatches on the variant instead of probing values.

use super::error_info::ErrorInfo;
use super::fields::Fields;
use serde_json::Value;

/// One argument of a variadic log call.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// No value at all. Produces no message when logged alone.
    Undefined,
    /// Null, booleans, finite numbers, strings and arrays.
    Primitive(Value),
    /// NaN or an infinity, which a JSON value cannot hold.
    NonFinite(f64),
    /// A plain structured object: its keys become fields.
    Object(Fields),
    /// An error: normalized into the record's `err` block.
    Error(ErrorInfo),
}

impl Arg {
    /// Wrap any Rust error.
    pub fn error<E: std::error::Error>(err: &E) -> Self {
        Arg::Error(ErrorInfo::from_error(err))
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Arg::Object(map),
            other => Arg::Primitive(other),
        }
    }
}

impl From<Fields> for Arg {
    fn from(fields: Fields) -> Self {
        Arg::Object(fields)
    }
}

impl From<ErrorInfo> for Arg {
    fn from(err: ErrorInfo) -> Self {
        Arg::Error(err)
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Primitive(Value::String(s.to_string()))
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Primitive(Value::String(s))
    }
}

impl From<&String> for Arg {
    fn from(s: &String) -> Self {
        Arg::Primitive(Value::String(s.clone()))
    }
}

impl From<()> for Arg {
    fn from(_: ()) -> Self {
        Arg::Undefined
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Arg::Undefined, Into::into)
    }
}

macro_rules! arg_from_primitive {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Primitive(Value::from(value))
                }
            }
        )*
    };
}

arg_from_primitive!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Arg::Primitive(Value::from(value))
        } else {
            Arg::NonFinite(value)
        }
    }
}

impl From<f32> for Arg {
    fn from(value: f32) -> Self {
        Arg::from(f64::from(value))
    }
}

/// Conversion of a whole argument list.
///
/// Implemented for single values, `Vec<Arg>`, arrays of `Arg` and tuples of
/// up to eight convertible values, so `log.info(("%s!", "debug"))` works.
pub trait IntoArgs {
    fn into_args(self) -> Vec<Arg>;
}

impl IntoArgs for Vec<Arg> {
    fn into_args(self) -> Vec<Arg> {
        self
    }
}

impl<const N: usize> IntoArgs for [Arg; N] {
    fn into_args(self) -> Vec<Arg> {
        self.into()
    }
}

impl IntoArgs for &[Arg] {
    fn into_args(self) -> Vec<Arg> {
        self.to_vec()
    }
}

impl IntoArgs for () {
    fn into_args(self) -> Vec<Arg> {
        Vec::new()
    }
}

macro_rules! into_args_single {
    ($($ty:ty),*) => {
        $(
            impl IntoArgs for $ty {
                fn into_args(self) -> Vec<Arg> {
                    vec![Arg::from(self)]
                }
            }
        )*
    };
}

into_args_single!(
    Arg, Value, Fields, ErrorInfo, &str, String, &String, bool, i32, i64, u32, u64, usize, f64
);

macro_rules! into_args_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Arg>),+> IntoArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_args(self) -> Vec<Arg> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

into_args_tuple!(A);
into_args_tuple!(A, B);
into_args_tuple!(A, B, C);
into_args_tuple!(A, B, C, D);
into_args_tuple!(A, B, C, D, E);
into_args_tuple!(A, B, C, D, E, F);
into_args_tuple!(A, B, C, D, E, F, G);
into_args_tuple!(A, B, C, D, E, F, G, H);
