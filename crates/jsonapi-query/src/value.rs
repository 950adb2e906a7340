//! Values accepted by the query builder.
//!
//! Filters, params and the page are limited to strings, numbers and flat
//! lists of those. These are modelled as [`Scalar`] and [`ParamValue`], which
//! typed callers build through `From` conversions and dynamic callers obtain
//! from `serde_json::Value` through `TryFrom`, classified by [`Kind`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{Error, Result};

/// Classification of a dynamic argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// A string
    String,
    /// A number
    Number,
    /// An ordered sequence
    Array,
    /// A key/value mapping
    Object,
    /// Anything else (`null`, booleans)
    Other,
}

impl Kind {
    /// Classify a JSON value.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
            Value::Null | Value::Bool(_) => Self::Other,
        }
    }

    /// Returns the kind name as used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Array => "array",
            Self::Object => "object",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A numeric query value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// Integral value
    Int(i64),
    /// Floating point value
    Float(f64),
}

impl Number {
    fn is_zero_or_nan(self) -> bool {
        match self {
            Self::Int(n) => n == 0,
            Self::Float(n) => n == 0.0 || n.is_nan(),
        }
    }
}

// Rendered the way a JavaScript backend client would stringify the number.
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) if n.is_nan() => f.write_str("NaN"),
            Self::Float(n) if n.is_infinite() => {
                f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Self::Float(n) if n == 0.0 => f.write_str("0"),
            Self::Float(n) if n.abs() >= 1e21 || n.abs() < 1e-6 => {
                let scientific = format!("{n:e}");
                match scientific.split_once('e') {
                    Some((mantissa, exp)) if !exp.starts_with('-') => {
                        write!(f, "{mantissa}e+{exp}")
                    }
                    _ => f.write_str(&scientific),
                }
            }
            Self::Float(n) => write!(f, "{n}"),
        }
    }
}

macro_rules! number_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

number_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! number_from_wide {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                #[allow(clippy::cast_precision_loss)]
                fn from(value: $ty) -> Self {
                    i64::try_from(value).map_or(Self::Float(value as f64), Self::Int)
                }
            }
        )*
    };
}

number_from_wide!(u64, usize, isize);

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// A single string or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// String value
    Text(String),
    /// Numeric value
    Number(Number),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => n.fmt(f),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Number> for Scalar {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

macro_rules! scalar_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Self::Number(Number::from(value))
                }
            }
        )*
    };
}

scalar_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl TryFrom<&Value> for Scalar {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Number(n) => Ok(Self::Number(
                n.as_i64()
                    .map(Number::Int)
                    .or_else(|| n.as_f64().map(Number::Float))
                    .ok_or_else(|| Error::invalid(format!("unrepresentable number {n}")))?,
            )),
            other => Err(Error::invalid(format!(
                "expected a string or number, got {}",
                Kind::of(other)
            ))),
        }
    }
}

/// The value of a filter or an arbitrary parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A single string or number
    Scalar(Scalar),
    /// An ordered list, serialized comma separated
    List(Vec<Scalar>),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => s.fmt(f),
            Self::List(items) => f.write_str(&join(items)),
        }
    }
}

/// Join scalars with `,`.
pub(crate) fn join(items: &[Scalar]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl From<Scalar> for ParamValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

macro_rules! param_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(Scalar::from(value))
                }
            }
        )*
    };
}

param_from_scalar!(
    &str, String, Number, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64
);

impl<T: Into<Scalar>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Scalar>, const N: usize> From<[T; N]> for ParamValue {
    fn from(values: [T; N]) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<&Value> for ParamValue {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(Scalar::try_from)
                .collect::<Result<Vec<_>>>()
                .map(Self::List),
            Value::String(_) | Value::Number(_) => Scalar::try_from(value).map(Self::Scalar),
            other => Err(Error::invalid(format!(
                "expected a string, number or array, got {}",
                Kind::of(other)
            ))),
        }
    }
}

/// Truthiness used by [`QueryBuilder::when`](crate::QueryBuilder::when) and
/// the page parameter.
///
/// `false`, zero, `NaN`, the empty string, `None` and JSON `null` are falsy;
/// everything else is truthy. Lists are truthy even when empty.
pub trait Truthy {
    /// Returns whether the value counts as true.
    fn is_truthy(&self) -> bool;
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl Truthy for str {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for Number {
    fn is_truthy(&self) -> bool {
        !self.is_zero_or_nan()
    }
}

impl Truthy for Scalar {
    fn is_truthy(&self) -> bool {
        match self {
            Self::Text(s) => s.is_truthy(),
            Self::Number(n) => n.is_truthy(),
        }
    }
}

impl Truthy for ParamValue {
    fn is_truthy(&self) -> bool {
        match self {
            Self::Scalar(s) => s.is_truthy(),
            Self::List(_) => true,
        }
    }
}

impl Truthy for Value {
    fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
            Self::String(s) => !s.is_empty(),
            Self::Array(_) | Self::Object(_) => true,
        }
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().is_some_and(Truthy::is_truthy)
    }
}

impl<T: Truthy + ?Sized> Truthy for &T {
    fn is_truthy(&self) -> bool {
        (**self).is_truthy()
    }
}

macro_rules! truthy_number {
    ($($ty:ty),*) => {
        $(
            impl Truthy for $ty {
                fn is_truthy(&self) -> bool {
                    Number::from(*self).is_truthy()
                }
            }
        )*
    };
}

truthy_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
