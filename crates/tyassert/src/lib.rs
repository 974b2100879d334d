//! # tyassert
//!
//! Assertion engine for verifying the constraint, coercion and ordering
//! semantics of runtime type definitions.
//!
//! A type under test is anything implementing [`TypeHandle`]: a display
//! name, a check predicate, an optional coercion, and a parent type. The
//! [`Engine`] runs lists of example values through five verbs
//! (`should_pass`, `should_fail`, `should_coerce_into`,
//! `should_pass_initially`, `should_fail_initially`) plus `should_sort` and
//! `should_be_subtype`, and records one [`AssertionOutcome`] per value into
//! an [`AssertionGroup`].
//!
//! Every outcome carries a [`DiagnosticTrace`] explaining which ancestor
//! accepted or rejected the value and which coercion path applied, on pass
//! as well as on fail.
//!
//! ## Modules
//!
//! - [`value`]: dynamic values with shared-reference identity
//! - [`handle`]: the type-model capabilities and [`SimpleType`]
//! - [`render`]: single-line value rendering
//! - [`trace`]: constraint and coercion traces
//! - [`identity`]: did a coercion change the value?
//! - [`outcome`]: per-value outcomes and labels
//! - [`group`]: nestable assertion groups
//! - [`sort`]: randomized sort validation
//! - [`engine`]: the verbs
//! - [`config`]: engine tunables
//! - [`error`]: error types
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use tyassert::prelude::*;
//!
//! let str_type = Rc::new(SimpleType::new("Str", |v| v.as_str().is_some()));
//! let hostname = SimpleType::new("Hostname", |v| {
//!     v.as_str().is_some_and(|s| s.ends_with(".ourdomain.com"))
//! })
//! .with_parent(str_type.clone())
//! .with_coercion_from(str_type, |v| {
//!     Value::str(format!("{}.ourdomain.com", v.as_str().unwrap_or_default()))
//! });
//!
//! let engine = Engine::with_defaults();
//! let mut root = AssertionGroup::new("hostnames");
//! let passed = engine
//!     .should_coerce_into(
//!         &mut root,
//!         &hostname,
//!         &[
//!             Value::str("ftp001-prod3"),
//!             Value::str("ftp001-prod3.ourdomain.com"),
//!         ],
//!     )
//!     .unwrap();
//! assert!(passed);
//! assert_eq!(root.summary().passed, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod engine;
pub mod error;
pub mod group;
pub mod handle;
pub mod identity;
pub mod outcome;
pub mod render;
pub mod sort;
pub mod trace;
pub mod value;

pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use error::{EngineError, TypeFault};
pub use group::{AssertionGroup, GroupDefect, GroupEntry, GroupSummary};
pub use handle::{Ancestors, SimpleType, SortableType, TypeHandle, ancestor_chain};
pub use outcome::{AssertionOutcome, Stage, Verb};
pub use render::Renderer;
pub use sort::{SortReport, SortValidator};
pub use trace::{DiagnosticTrace, TraceBuilder};
pub use value::{Composite, Reference, Value};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::Engine;
    pub use crate::error::{EngineError, TypeFault};
    pub use crate::group::AssertionGroup;
    pub use crate::handle::{SimpleType, SortableType, TypeHandle};
    pub use crate::outcome::{AssertionOutcome, Stage, Verb};
    pub use crate::value::Value;
}
