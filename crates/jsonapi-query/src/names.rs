//! Parameter naming tables.
//!
//! Backends do not always use the JSON:API key names, so the reserved keys a
//! builder emits can be remapped. A [`ParameterNames`] table can either be
//! injected into a single builder or installed process-wide with
//! [`define_custom_parameter_names`], where it applies to every builder
//! without its own table until [`forget_custom_parameter_names`] is called.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

use crate::error::Result;

/// Reserved keys emitted by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservedName {
    /// `filter[<key>]`
    Filter,
    /// `sort`
    Sort,
    /// `include`
    Include,
    /// `append`
    Append,
    /// `fields[<resource>]`
    Fields,
    /// `page`
    Page,
}

impl ReservedName {
    /// All reserved names.
    pub const ALL: [Self; 6] = [
        Self::Filter,
        Self::Sort,
        Self::Include,
        Self::Append,
        Self::Fields,
        Self::Page,
    ];

    /// Returns the default key for this name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Sort => "sort",
            Self::Include => "include",
            Self::Append => "append",
            Self::Fields => "fields",
            Self::Page => "page",
        }
    }
}

impl fmt::Display for ReservedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from logical parameter names to the keys a backend expects.
///
/// Any name may be mapped, not only the [`ReservedName`]s; names without an
/// entry resolve to themselves. Serializes as a plain JSON object:
///
/// ```
/// use jsonapi_query::ParameterNames;
///
/// let names = ParameterNames::from_json(r#"{"page": "p", "filter": "where"}"#).unwrap();
/// assert_eq!(names.resolve("page"), "p");
/// assert_eq!(names.resolve("sort"), "sort");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterNames {
    overrides: BTreeMap<String, String>,
}

impl ParameterNames {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a JSON object of name to override.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the input is not a
    /// JSON object of strings.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Map `name` to `key`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, key: impl Into<String>) -> Self {
        self.overrides.insert(name.into(), key.into());
        self
    }

    /// Map a reserved name to `key`.
    #[must_use]
    pub fn with_reserved(self, name: ReservedName, key: impl Into<String>) -> Self {
        self.with(name.as_str(), key)
    }

    /// Returns the override for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.overrides.get(name).map(String::as_str)
    }

    /// Returns the override for `name`, or `name` itself.
    #[must_use]
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).unwrap_or(name)
    }

    /// Number of overrides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    /// Returns true if the table has no overrides.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterNames
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            overrides: iter
                .into_iter()
                .map(|(name, key)| (name.into(), key.into()))
                .collect(),
        }
    }
}

static CUSTOM_NAMES: RwLock<Option<ParameterNames>> = RwLock::new(None);

/// Install `names` as the process-wide naming table, replacing any previous
/// table entirely.
pub fn define_custom_parameter_names(names: ParameterNames) {
    debug!(overrides = names.len(), "defining custom parameter names");
    *CUSTOM_NAMES.write().unwrap_or_else(PoisonError::into_inner) = Some(names);
}

/// Remove the process-wide naming table.
pub fn forget_custom_parameter_names() {
    debug!("forgetting custom parameter names");
    *CUSTOM_NAMES.write().unwrap_or_else(PoisonError::into_inner) = None;
}

/// Returns a copy of the process-wide naming table, if one is defined.
#[must_use]
pub fn custom_parameter_names() -> Option<ParameterNames> {
    CUSTOM_NAMES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Resolve `name` through the process-wide naming table.
#[must_use]
pub fn parameter_name(name: &str) -> String {
    with_custom_parameter_names(|names| names.map_or(name, |n| n.resolve(name)).to_string())
}

/// Run `f` against the process-wide table under a single read lock.
pub(crate) fn with_custom_parameter_names<R>(f: impl FnOnce(Option<&ParameterNames>) -> R) -> R {
    let guard = CUSTOM_NAMES.read().unwrap_or_else(PoisonError::into_inner);
    f(guard.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_falls_back_to_name() {
        let names = ParameterNames::new().with_reserved(ReservedName::Page, "PAGE");
        assert_eq!(names.resolve("page"), "PAGE");
        assert_eq!(names.resolve("filter"), "filter");
        assert_eq!(names.resolve("anything"), "anything");
    }

    #[test]
    fn test_with_overwrites() {
        let names = ParameterNames::new().with("sort", "a").with("sort", "b");
        assert_eq!(names.get("sort"), Some("b"));
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_from_iterator() {
        let names: ParameterNames = [("filter", "where"), ("include", "with")]
            .into_iter()
            .collect();
        assert_eq!(names.resolve("filter"), "where");
        assert_eq!(names.resolve("include"), "with");
    }

    #[test]
    fn test_from_json() {
        let names = ParameterNames::from_json(r#"{"fields": "select"}"#).unwrap();
        assert_eq!(names.get("fields"), Some("select"));
        assert!(ParameterNames::from_json(r#"{"fields": 1}"#).is_err());
        assert!(ParameterNames::from_json("[]").is_err());
    }

    #[test]
    fn test_serializes_as_object() {
        let names = ParameterNames::new().with("page", "p");
        assert_eq!(serde_json::to_string(&names).unwrap(), r#"{"page":"p"}"#);
    }

    #[test]
    fn test_reserved_names() {
        let keys: Vec<_> = ReservedName::ALL.iter().map(|n| n.as_str()).collect();
        assert_eq!(
            keys,
            vec!["filter", "sort", "include", "append", "fields", "page"]
        );
        assert_eq!(
            serde_json::to_string(&ReservedName::Include).unwrap(),
            r#""include""#
        );
    }
}
