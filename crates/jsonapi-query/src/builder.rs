//! The fluent query builder.

use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;
use url::Url;

use crate::encode::QueryPairs;
use crate::error::Result;
use crate::input::Names;
use crate::names::{self, ParameterNames, ReservedName};
use crate::value::{join, ParamValue, Scalar, Truthy};

/// Accumulates filters, sorts, includes, appends, sparse fieldsets, the page
/// and arbitrary parameters, then renders them as a query string.
///
/// Mutators take `&mut self` and return it, so calls chain on a temporary:
///
/// ```
/// use jsonapi_query::QueryBuilder;
///
/// let url = QueryBuilder::new("/users")
///     .filter("name", "ada")
///     .sort(["-created_at", "name"])
///     .include("posts")
///     .page(2_u32)
///     .build();
///
/// assert_eq!(
///     url,
///     "/users?filter%5Bname%5D=ada&include=posts&page=2&sort=-created_at%2Cname"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    base_url: String,
    filters: BTreeMap<String, ParamValue>,
    sorts: Vec<String>,
    includes: Vec<String>,
    appends: Vec<String>,
    fields: BTreeMap<String, Vec<Scalar>>,
    page: Option<Scalar>,
    params: BTreeMap<String, ParamValue>,
    names: Option<ParameterNames>,
}

impl QueryBuilder {
    /// Create a builder for `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Create a builder whose base is an already parsed URL.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self::new(url.as_str())
    }

    /// Use `names` for this builder instead of the process-wide table.
    #[must_use]
    pub fn with_parameter_names(mut self, names: ParameterNames) -> Self {
        self.names = Some(names);
        self
    }

    /// Install a process-wide naming table. See
    /// [`define_custom_parameter_names`](names::define_custom_parameter_names).
    pub fn define_custom_parameter_names(names: ParameterNames) {
        names::define_custom_parameter_names(names);
    }

    /// Remove the process-wide naming table.
    pub fn forget_custom_parameter_names() {
        names::forget_custom_parameter_names();
    }

    /// Resolve `name` through the process-wide naming table.
    #[must_use]
    pub fn parameter_name(name: &str) -> String {
        names::parameter_name(name)
    }

    /// Replace the base URL.
    pub fn base_url(&mut self, base_url: impl Into<String>) -> &mut Self {
        self.base_url = base_url.into();
        self
    }

    /// Set an arbitrary parameter, emitted under its literal key.
    pub fn param(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set several arbitrary parameters.
    pub fn params<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.params
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Remove the named parameters. Unknown keys are ignored; an empty list
    /// clears them all.
    pub fn forget_param(&mut self, keys: impl Into<Names>) -> &mut Self {
        let keys = keys.into();
        if keys.clears_all() {
            return self.clear_params();
        }
        for key in keys.flatten() {
            self.params.remove(&key);
        }
        self
    }

    /// Remove every arbitrary parameter.
    pub fn clear_params(&mut self) -> &mut Self {
        self.params.clear();
        self
    }

    /// Set a filter, emitted as `filter[<key>]`.
    pub fn filter(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Set several filters.
    pub fn filters<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.filters
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Remove the named filters. Unknown keys are ignored; an empty list
    /// clears them all.
    pub fn forget_filter(&mut self, keys: impl Into<Names>) -> &mut Self {
        let keys = keys.into();
        if keys.clears_all() {
            return self.clear_filters();
        }
        for key in keys.flatten() {
            self.filters.remove(&key);
        }
        self
    }

    /// Remove every filter.
    pub fn clear_filters(&mut self) -> &mut Self {
        self.filters.clear();
        self
    }

    /// Add relationships to include. Duplicates are kept.
    pub fn include(&mut self, relations: impl Into<Names>) -> &mut Self {
        self.includes.extend(relations.into().flatten());
        self
    }

    /// Remove every occurrence of the named includes. An empty list
    /// removes all of them.
    pub fn forget_include(&mut self, relations: impl Into<Names>) -> &mut Self {
        remove_all(&mut self.includes, relations.into());
        self
    }

    /// Remove every include.
    pub fn clear_includes(&mut self) -> &mut Self {
        self.includes.clear();
        self
    }

    /// Add attributes to append. Duplicates are kept.
    pub fn append(&mut self, attributes: impl Into<Names>) -> &mut Self {
        self.appends.extend(attributes.into().flatten());
        self
    }

    /// Remove every occurrence of the named appends. An empty list
    /// removes all of them.
    pub fn forget_append(&mut self, attributes: impl Into<Names>) -> &mut Self {
        remove_all(&mut self.appends, attributes.into());
        self
    }

    /// Remove every append.
    pub fn clear_appends(&mut self) -> &mut Self {
        self.appends.clear();
        self
    }

    /// Add sort fields in priority order. Duplicates are kept.
    pub fn sort(&mut self, fields: impl Into<Names>) -> &mut Self {
        self.sorts.extend(fields.into().flatten());
        self
    }

    /// Remove every occurrence of the named sort fields. An empty list
    /// removes all of them.
    pub fn forget_sort(&mut self, fields: impl Into<Names>) -> &mut Self {
        remove_all(&mut self.sorts, fields.into());
        self
    }

    /// Remove every sort field.
    pub fn clear_sorts(&mut self) -> &mut Self {
        self.sorts.clear();
        self
    }

    /// Select the fields returned for `resource`, emitted as
    /// `fields[<resource>]`. Replaces any previous selection for it.
    pub fn fields<S>(
        &mut self,
        resource: impl Into<String>,
        fields: impl IntoIterator<Item = S>,
    ) -> &mut Self
    where
        S: Into<Scalar>,
    {
        self.fields
            .insert(resource.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    /// Select fields for several resources.
    pub fn fields_map<K, L, S>(&mut self, entries: impl IntoIterator<Item = (K, L)>) -> &mut Self
    where
        K: Into<String>,
        L: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        for (resource, fields) in entries {
            self.fields(resource, fields);
        }
        self
    }

    /// Drop the field selections of the named resources; an empty list
    /// drops them all.
    pub fn forget_fields(&mut self, resources: impl Into<Names>) -> &mut Self {
        let resources = resources.into();
        if resources.clears_all() {
            return self.clear_fields();
        }
        for resource in resources.flatten() {
            self.fields.remove(&resource);
        }
        self
    }

    /// Drop every field selection.
    pub fn clear_fields(&mut self) -> &mut Self {
        self.fields.clear();
        self
    }

    /// Set the page. A falsy page (`0`, `""`) is not emitted.
    pub fn page(&mut self, page: impl Into<Scalar>) -> &mut Self {
        self.page = Some(page.into());
        self
    }

    /// Unset the page.
    pub fn forget_page(&mut self) -> &mut Self {
        self.page = None;
        self
    }

    /// Run `callback` against the builder.
    pub fn tap(&mut self, callback: impl FnOnce(&mut Self)) -> &mut Self {
        callback(self);
        self
    }

    /// Run `callback` against the builder if `condition` is truthy.
    pub fn when<C>(&mut self, condition: C, callback: impl FnOnce(&mut Self)) -> &mut Self
    where
        C: Truthy,
    {
        if condition.is_truthy() {
            callback(self);
        }
        self
    }

    /// Evaluate `predicate`, then behave like [`when`](Self::when).
    pub fn when_with<C>(
        &mut self,
        predicate: impl FnOnce() -> C,
        callback: impl FnOnce(&mut Self),
    ) -> &mut Self
    where
        C: Truthy,
    {
        self.when(predicate(), callback)
    }

    /// Return the raw (unencoded) pairs in the order they are emitted.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.sorted_pairs().into_pairs()
    }

    /// Render `<base_url>?<pairs>`.
    ///
    /// Pairs are sorted by their raw key before both sides are
    /// percent-encoded. The `?` is emitted even when there are no pairs.
    #[must_use]
    pub fn build(&self) -> String {
        let pairs = self.sorted_pairs();
        debug!(base_url = %self.base_url, pairs = pairs.len(), "built query string");
        format!("{}?{}", self.base_url, pairs.encode())
    }

    /// Render the query and parse it as an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`](crate::Error::InvalidUrl) if the base URL
    /// is relative or malformed.
    pub fn build_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.build())?)
    }

    fn sorted_pairs(&self) -> QueryPairs {
        let pairs = match &self.names {
            Some(names) => self.collect_pairs(Some(names)),
            None => names::with_custom_parameter_names(|names| self.collect_pairs(names)),
        };
        pairs.sorted()
    }

    fn collect_pairs(&self, names: Option<&ParameterNames>) -> QueryPairs {
        let mut pairs = QueryPairs::new();

        let filter = resolve(names, ReservedName::Filter);
        for (key, value) in &self.filters {
            pairs.push(format!("{filter}[{key}]"), value);
        }

        pairs.push_joined(resolve(names, ReservedName::Sort), &self.sorts);
        pairs.push_joined(resolve(names, ReservedName::Include), &self.includes);
        pairs.push_joined(resolve(names, ReservedName::Append), &self.appends);

        let fields = resolve(names, ReservedName::Fields);
        for (resource, list) in &self.fields {
            pairs.push(format!("{fields}[{resource}]"), join(list));
        }

        pairs.push_opt(
            resolve(names, ReservedName::Page),
            self.page.as_ref().filter(|page| page.is_truthy()),
        );

        for (key, value) in &self.params {
            pairs.push(key.as_str(), value);
        }

        pairs
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

fn resolve(names: Option<&ParameterNames>, name: ReservedName) -> &str {
    names.map_or(name.as_str(), |names| names.resolve(name.as_str()))
}

fn remove_all(list: &mut Vec<String>, names: Names) {
    if names.clears_all() {
        list.clear();
        return;
    }
    let names = names.flatten();
    list.retain(|item| !names.contains(item));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qb() -> QueryBuilder {
        QueryBuilder::new("/")
    }

    #[test]
    fn test_empty_builder_emits_question_mark() {
        assert_eq!(qb().build(), "/?");
        assert_eq!(QueryBuilder::default().build(), "?");
    }

    #[test]
    fn test_base_url_replaced() {
        assert_eq!(qb().base_url("/b").build(), "/b?");
    }

    #[test]
    fn test_filter_overwrites_key() {
        assert_eq!(
            qb().filter("a", "b").filter("a", vec!["c", "d"]).build(),
            "/?filter%5Ba%5D=c%2Cd"
        );
    }

    #[test]
    fn test_lists_keep_duplicates() {
        assert_eq!(qb().sort("a").sort("a").build(), "/?sort=a%2Ca");
        assert_eq!(qb().include(["x", "x"]).build(), "/?include=x%2Cx");
    }

    #[test]
    fn test_forget_removes_every_occurrence() {
        assert_eq!(
            qb().sort(["a", "b", "a", "c"]).forget_sort("a").build(),
            "/?sort=b%2Cc"
        );
    }

    #[test]
    fn test_forget_with_nested_lists() {
        let nested = Names::from(vec![Names::from("a"), Names::from(vec!["b"])]);
        assert_eq!(
            qb().sort(["a", "b", "c"]).forget_sort(nested).build(),
            "/?sort=c"
        );
    }

    #[test]
    fn test_forget_with_empty_list_clears() {
        assert_eq!(
            qb().sort(["a", "b"]).forget_sort(Vec::<&str>::new()).build(),
            "/?"
        );
        assert_eq!(
            qb().filter("a", "b")
                .param("c", "d")
                .forget_filter(Vec::<String>::new())
                .build(),
            "/?c=d"
        );
        assert_eq!(
            qb().include(["x", "y"])
                .forget_include(vec![Names::from("x"), Names::from(Vec::<&str>::new())])
                .build(),
            "/?"
        );
    }

    #[test]
    fn test_appends_are_emitted() {
        assert_eq!(
            qb().append(["full_name", "age"]).build(),
            "/?append=full_name%2Cage"
        );
        assert_eq!(qb().append("a").clear_appends().build(), "/?");
    }

    #[test]
    fn test_page_zero_is_not_emitted() {
        assert_eq!(qb().page(0_u32).build(), "/?");
        assert_eq!(qb().page("").build(), "/?");
        assert_eq!(qb().page("0").build(), "/?page=0");
    }

    #[test]
    fn test_page_overwrites_and_forgets() {
        assert_eq!(qb().page(1_u32).page("5").build(), "/?page=5");
        assert_eq!(qb().page(3_u32).forget_page().build(), "/?");
    }

    #[test]
    fn test_fields_map() {
        assert_eq!(
            qb()
                .fields_map([("a", vec!["b", "c"]), ("d", vec!["e"])])
                .build(),
            "/?fields%5Ba%5D=b%2Cc&fields%5Bd%5D=e"
        );
    }

    #[test]
    fn test_instance_names_take_precedence() {
        let names = ParameterNames::new()
            .with_reserved(ReservedName::Filter, "where")
            .with_reserved(ReservedName::Append, "with");
        assert_eq!(
            QueryBuilder::new("/")
                .with_parameter_names(names)
                .filter("a", "b")
                .append("c")
                .param("filter", "x")
                .build(),
            "/?filter=x&where%5Ba%5D=b&with=c"
        );
    }

    #[test]
    fn test_to_pairs_are_sorted_and_raw() {
        let pairs = qb().param("z", "d").param("a", "d").fields("b", ["a"]).to_pairs();
        let keys: Vec<_> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "fields[b]", "z"]);
    }

    #[test]
    fn test_build_is_repeatable() {
        let mut builder = qb();
        builder.filter("a", "b").sort("c");
        assert_eq!(builder.build(), builder.build());
        assert_eq!(builder.to_string(), builder.build());
    }

    #[test]
    fn test_when_and_tap() {
        let mut calls = 0;
        qb().when_with(
            || true,
            |_| {
                calls += 1;
            },
        );
        assert_eq!(calls, 1);

        assert_eq!(
            qb().when(false, |b| {
                b.page(2_u32);
            })
            .build(),
            "/?"
        );
        assert_eq!(
            qb().tap(|b| {
                b.param("a", "b");
            })
            .build(),
            "/?a=b"
        );
    }

    #[test]
    fn test_build_url() {
        let base = Url::parse("https://api.example.com/users").unwrap();
        let url = QueryBuilder::from_url(&base).page(2_u32).build_url().unwrap();
        assert_eq!(url.query(), Some("page=2"));
        assert!(qb().build_url().is_err());
    }
}
