//! The capability contract consumed from a type model.
//!
//! The engine never defines or validates types. It only exercises a type's
//! already-implemented behaviour through [`TypeHandle`]:
//!
//! - [`TypeHandle::check`] decides whether a value satisfies the type
//! - [`TypeHandle::coerce`] converts a value, when the type has a coercion
//! - [`TypeHandle::parent`] links the type into a linear ancestor chain
//! - [`TypeHandle::coercion_candidates`] lists, in priority order, the types
//!   whose check selects a coercion path
//!
//! Sorting is a separate capability, [`SortableType`], because most types do
//! not define an ordering.
//!
//! [`SimpleType`] is a closure-backed implementation for callers without a
//! type model of their own.

mod simple;

use std::borrow::Cow;

pub use simple::SimpleType;

use crate::error::{EngineError, TypeFault};
use crate::value::Value;

/// A type object the engine can check values against.
///
/// Handles are only ever read. `check` and `coerce` may fault; a fault
/// aborts the enclosing assertion group.
pub trait TypeHandle {
    /// Human-readable name used in labels and trace lines.
    fn display_name(&self) -> &str;

    /// Returns whether `value` satisfies this type.
    ///
    /// # Errors
    ///
    /// Returns a [`TypeFault`] if the predicate cannot produce a verdict.
    fn check(&self, value: &Value) -> Result<bool, TypeFault>;

    /// Returns `true` if [`TypeHandle::coerce`] is defined.
    fn has_coercion(&self) -> bool {
        false
    }

    /// Coerces `value`. A coercion that finds no applicable path returns the
    /// value unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TypeFault::Unsupported`] for types without a coercion, or a
    /// [`TypeFault`] raised by the coercion itself.
    fn coerce(&self, value: &Value) -> Result<Value, TypeFault> {
        let _ = value;
        Err(TypeFault::unsupported("coerce"))
    }

    /// The immediate ancestor, or `None` at the root.
    fn parent(&self) -> Option<&dyn TypeHandle> {
        None
    }

    /// Types whose check selects a coercion path, highest priority first.
    fn coercion_candidates(&self) -> Vec<&dyn TypeHandle> {
        Vec::new()
    }

    /// Implementation-defined description, shown verbatim in traces.
    fn source_definition(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}

/// A type that also provides an ordering over its values.
pub trait SortableType: TypeHandle {
    /// Returns `values` in this type's order.
    ///
    /// # Errors
    ///
    /// Returns a [`TypeFault`] if the ordering cannot be computed.
    fn sort(&self, values: &[Value]) -> Result<Vec<Value>, TypeFault>;
}

/// Lazy walk from a type through each `parent` up to the root, inclusive of
/// the starting type.
///
/// The walk is capped: once more than `limit` types have been produced, a
/// single [`EngineError::AncestorChainTooLong`] is yielded and the iterator
/// is exhausted. This turns a cyclic or runaway chain into a reported defect.
#[derive(Clone)]
pub struct Ancestors<'a> {
    origin: &'a dyn TypeHandle,
    next: Option<&'a dyn TypeHandle>,
    visited: usize,
    limit: usize,
}

impl<'a> Ancestors<'a> {
    /// Starts a walk at `ty`, visiting at most `limit` types.
    #[must_use]
    pub fn new(ty: &'a dyn TypeHandle, limit: usize) -> Self {
        Self {
            origin: ty,
            next: Some(ty),
            visited: 0,
            limit,
        }
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = Result<&'a dyn TypeHandle, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        if self.visited == self.limit {
            self.next = None;
            return Some(Err(EngineError::chain_too_long(
                self.origin.display_name(),
                self.limit,
            )));
        }
        self.visited += 1;
        self.next = current.parent();
        Some(Ok(current))
    }
}

/// Collects the ancestor chain of `ty`, root last.
///
/// # Errors
///
/// Returns [`EngineError::AncestorChainTooLong`] if the chain is longer than
/// `limit`.
pub fn ancestor_chain(
    ty: &dyn TypeHandle,
    limit: usize,
) -> Result<Vec<&dyn TypeHandle>, EngineError> {
    Ancestors::new(ty, limit).collect()
}
