//! Argument normalization shared by the builder's mutators.
//!
//! List-style mutators (`sort`, `include`, `append` and every `forget_*`)
//! take [`Names`]: a single name or an arbitrarily nested list of names,
//! flattened by one recursive walk. Map-style mutators given dynamic
//! arguments go through [`assignments`], which enforces the
//! "one object, or a key and a value" arity contract.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::value::{Kind, ParamValue, Scalar};

/// A name or a nested list of names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Names {
    /// A single name
    One(String),
    /// A list of names, each of which may itself be a list
    Many(Vec<Names>),
}

impl Names {
    /// Build from variadic JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any argument, at any depth, is
    /// neither a string nor an array.
    pub fn from_args(args: &[Value]) -> Result<Self> {
        args.iter()
            .map(Self::try_from)
            .collect::<Result<Vec<_>>>()
            .map(Self::Many)
    }

    /// Returns true if an empty list appears at any depth.
    ///
    /// Forgetting such names clears the whole collection, the same as
    /// forgetting with no names at all.
    #[must_use]
    pub fn clears_all(&self) -> bool {
        match self {
            Self::One(_) => false,
            Self::Many(names) => names.is_empty() || names.iter().any(Self::clears_all),
        }
    }

    /// Flatten into names in encounter order.
    #[must_use]
    pub fn flatten(self) -> Vec<String> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<String>) {
        match self {
            Self::One(name) => out.push(name),
            Self::Many(names) => {
                for names in names {
                    names.flatten_into(out);
                }
            }
        }
    }
}

impl TryFrom<&Value> for Names {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(name) => Ok(Self::One(name.clone())),
            Value::Array(items) => Self::from_args(items),
            other => Err(Error::invalid(format!(
                "expected a string or an array of strings, got {}",
                Kind::of(other)
            ))),
        }
    }
}

impl From<&str> for Names {
    fn from(name: &str) -> Self {
        Self::One(name.to_string())
    }
}

impl From<String> for Names {
    fn from(name: String) -> Self {
        Self::One(name)
    }
}

impl<T: Into<Names>> From<Vec<T>> for Names {
    fn from(names: Vec<T>) -> Self {
        Self::Many(names.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Names>, const N: usize> From<[T; N]> for Names {
    fn from(names: [T; N]) -> Self {
        Self::Many(names.into_iter().map(Into::into).collect())
    }
}

/// Normalize the arguments of a map-style mutator into `(key, value)` pairs.
///
/// Accepts either a single object, whose entries are each converted, or
/// exactly a string key and a value. Nothing is returned unless every entry
/// converts, so callers can apply the result without partial effects.
pub(crate) fn assignments<T>(
    operation: &str,
    args: &[Value],
    convert: impl Fn(&Value) -> Result<T>,
) -> Result<Vec<(String, T)>> {
    match args {
        [Value::Object(entries)] => entries
            .iter()
            .map(|(key, value)| Ok((key.clone(), convert(value)?)))
            .collect(),
        [other] => Err(Error::invalid(format!(
            "{operation} expects an object when given a single argument, got {}",
            Kind::of(other)
        ))),
        [Value::String(key), value] => Ok(vec![(key.clone(), convert(value)?)]),
        [other, _] => Err(Error::invalid(format!(
            "{operation} key must be a string, got {}",
            Kind::of(other)
        ))),
        _ => Err(Error::invalid(format!(
            "{operation} expects one or two arguments, got {}",
            args.len()
        ))),
    }
}

/// Convert a filter or parameter value.
pub(crate) fn param_value(value: &Value) -> Result<ParamValue> {
    ParamValue::try_from(value)
}

/// Convert a field list, which must be an array of strings or numbers.
pub(crate) fn field_list(value: &Value) -> Result<Vec<Scalar>> {
    match value {
        Value::Array(items) => items.iter().map(Scalar::try_from).collect(),
        other => Err(Error::invalid(format!(
            "field list must be an array, got {}",
            Kind::of(other)
        ))),
    }
}
