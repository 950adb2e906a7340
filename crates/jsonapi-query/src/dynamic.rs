//! Mutators taking untyped JSON arguments.
//!
//! These mirror the typed API for callers whose query components arrive as
//! data (request payloads, saved searches, scripting layers). Each call
//! validates all of its arguments before touching the builder, so a rejected
//! call has no effect while earlier calls in the chain stay applied.

use serde_json::Value;

use crate::builder::QueryBuilder;
use crate::error::{Error, Result};
use crate::input::{assignments, field_list, param_value, Names};
use crate::value::{Kind, Scalar};

impl QueryBuilder {
    /// Set parameters from `[{key: value, ...}]` or `[key, value]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for any other arity, a non-string
    /// key, or a value that is not a string, number or array of those.
    pub fn param_args(&mut self, args: &[Value]) -> Result<&mut Self> {
        let entries = assignments("param", args, param_value)?;
        Ok(self.params(entries))
    }

    /// Set filters from `[{key: value, ...}]` or `[key, value]`.
    ///
    /// # Errors
    ///
    /// Same contract as [`param_args`](Self::param_args).
    pub fn filter_args(&mut self, args: &[Value]) -> Result<&mut Self> {
        let entries = assignments("filter", args, param_value)?;
        Ok(self.filters(entries))
    }

    /// Select fields from `[{resource: [field, ...], ...}]` or
    /// `[resource, [field, ...]]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for any other arity, a non-string
    /// resource, or a field list that is not an array of strings or numbers.
    pub fn fields_args(&mut self, args: &[Value]) -> Result<&mut Self> {
        let entries = assignments("fields", args, field_list)?;
        Ok(self.fields_map(entries))
    }

    /// Add includes; each argument is a string or a nested array of strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any argument is neither.
    pub fn include_args(&mut self, args: &[Value]) -> Result<&mut Self> {
        Ok(self.include(Names::from_args(args)?))
    }

    /// Add appends; each argument is a string or a nested array of strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any argument is neither.
    pub fn append_args(&mut self, args: &[Value]) -> Result<&mut Self> {
        Ok(self.append(Names::from_args(args)?))
    }

    /// Add sorts; each argument is a string or a nested array of strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any argument is neither.
    pub fn sort_args(&mut self, args: &[Value]) -> Result<&mut Self> {
        Ok(self.sort(Names::from_args(args)?))
    }

    /// Forget parameters. No arguments, or an empty array at any depth,
    /// clears them all.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if an argument is neither a string
    /// nor a nested array of strings.
    pub fn forget_param_args(&mut self, args: &[Value]) -> Result<&mut Self> {
        Ok(self.forget_param(Names::from_args(args)?))
    }

    /// Forget filters; no arguments or an empty array clears them all.
    ///
    /// # Errors
    ///
    /// Same contract as [`forget_param_args`](Self::forget_param_args).
    pub fn forget_filter_args(&mut self, args: &[Value]) -> Result<&mut Self> {
        Ok(self.forget_filter(Names::from_args(args)?))
    }

    /// Forget field selections; no arguments or an empty array clears them all.
    ///
    /// # Errors
    ///
    /// Same contract as [`forget_param_args`](Self::forget_param_args).
    pub fn forget_fields_args(&mut self, args: &[Value]) -> Result<&mut Self> {
        Ok(self.forget_fields(Names::from_args(args)?))
    }

    /// Forget includes; no arguments or an empty array clears them all.
    ///
    /// # Errors
    ///
    /// Same contract as [`forget_param_args`](Self::forget_param_args).
    pub fn forget_include_args(&mut self, args: &[Value]) -> Result<&mut Self> {
        Ok(self.forget_include(Names::from_args(args)?))
    }

    /// Forget appends; no arguments or an empty array clears them all.
    ///
    /// # Errors
    ///
    /// Same contract as [`forget_param_args`](Self::forget_param_args).
    pub fn forget_append_args(&mut self, args: &[Value]) -> Result<&mut Self> {
        Ok(self.forget_append(Names::from_args(args)?))
    }

    /// Forget sorts; no arguments or an empty array clears them all.
    ///
    /// # Errors
    ///
    /// Same contract as [`forget_param_args`](Self::forget_param_args).
    pub fn forget_sort_args(&mut self, args: &[Value]) -> Result<&mut Self> {
        Ok(self.forget_sort(Names::from_args(args)?))
    }

    /// Set the page from a string or number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for any other kind of value.
    pub fn page_arg(&mut self, page: &Value) -> Result<&mut Self> {
        let page = Scalar::try_from(page).map_err(|_| {
            Error::invalid(format!(
                "page must be a string or number, got {}",
                Kind::of(page)
            ))
        })?;
        Ok(self.page(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn qb() -> QueryBuilder {
        QueryBuilder::new("/")
    }

    #[test]
    fn test_param_args_forms() {
        let mut builder = qb();
        builder
            .param_args(&[json!("a"), json!("b")])
            .unwrap()
            .param_args(&[json!({"c": "d"})])
            .unwrap();
        assert_eq!(builder.build(), "/?a=b&c=d");
    }

    #[test]
    fn test_rejected_call_has_no_effect() {
        let mut builder = qb();
        builder.filter("keep", "me");
        let err = builder
            .filter_args(&[json!({"a": "b", "c": {}})])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(builder.build(), "/?filter%5Bkeep%5D=me");
    }

    #[test]
    fn test_page_arg() {
        let mut builder = qb();
        builder.page_arg(&json!(3)).unwrap();
        assert_eq!(builder.build(), "/?page=3");
        assert!(builder.page_arg(&json!([])).is_err());
        assert!(builder.page_arg(&json!(null)).is_err());
        assert_eq!(builder.build(), "/?page=3");
    }

    #[test]
    fn test_forget_args_without_arguments_clears() {
        let mut builder = qb();
        builder.sort(["a", "b"]).include("c");
        builder.forget_sort_args(&[]).unwrap();
        assert_eq!(builder.build(), "/?include=c");
    }

    #[test]
    fn test_forget_args_with_empty_array_clears() {
        let mut builder = qb();
        builder.sort(["a", "b"]).fields("user", ["name"]);
        builder.forget_sort_args(&[json!([])]).unwrap();
        builder.forget_fields_args(&[json!("post"), json!([[]])]).unwrap();
        assert_eq!(builder.build(), "/?");
    }

    #[test]
    fn test_invalid_forget_args_leave_state_alone() {
        let mut builder = qb();
        builder.sort(["a", "b"]);
        assert!(builder.forget_sort_args(&[json!([]), json!(null)]).is_err());
        assert_eq!(builder.build(), "/?sort=a%2Cb");
    }

    #[test]
    fn test_fields_args_rejects_non_arrays() {
        assert!(qb().fields_args(&[json!("a"), json!("b")]).is_err());
        assert!(qb().fields_args(&[json!({"a": null})]).is_err());
        assert!(qb().fields_args(&[json!("a")]).is_err());
    }
}
