//! # jsonapi-query
//!
//! Fluent construction of JSON:API style query strings.
//!
//! A [`QueryBuilder`] accumulates filters, sorts, includes, appends, sparse
//! fieldsets, the page and arbitrary parameters, and renders them into a
//! deterministic, percent-encoded URL: pairs are always ordered by key, so
//! the same query produces the same string regardless of call order.
//!
//! ```
//! use jsonapi_query::QueryBuilder;
//!
//! let url = QueryBuilder::new("/")
//!     .filter("a", "b")
//!     .sort("c")
//!     .include(["y", "s"])
//!     .page(3_u32)
//!     .param("z", "d")
//!     .build();
//!
//! assert_eq!(url, "/?filter%5Ba%5D=b&include=y%2Cs&page=3&sort=c&z=d");
//! ```
//!
//! ## Modules
//!
//! - [`builder`] - The query builder and its serialization
//! - [`dynamic`] - Mutators accepting untyped JSON arguments
//! - [`names`] - Custom parameter names, per builder or process-wide
//! - [`value`] - Accepted value types and their classification
//! - [`input`] - Normalization of nested name lists
//! - [`encode`] - Pair ordering and percent-encoding
//! - [`error`] - Error types

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod builder;
pub mod dynamic;
pub mod encode;
pub mod error;
pub mod input;
pub mod names;
pub mod value;

// Re-export commonly used types
pub use builder::QueryBuilder;
pub use error::{Error, Result};
pub use input::Names;
pub use names::{
    custom_parameter_names, define_custom_parameter_names, forget_custom_parameter_names,
    parameter_name, ParameterNames, ReservedName,
};
pub use value::{Kind, Number, ParamValue, Scalar, Truthy};
