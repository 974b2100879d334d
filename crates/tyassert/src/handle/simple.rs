//! Closure-backed type model.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use super::{SortableType, TypeHandle};
use crate::error::TypeFault;
use crate::value::Value;

type CheckFn = Box<dyn Fn(&Value) -> Result<bool, TypeFault>>;
type CoerceFn = Box<dyn Fn(&Value) -> Result<Value, TypeFault>>;
type SortFn = Box<dyn Fn(&[Value]) -> Result<Vec<Value>, TypeFault>>;

/// A type assembled from closures.
///
/// A `SimpleType` refines its parent: [`TypeHandle::check`] passes only if
/// the parent's check passes and then the type's own predicate does.
///
/// Coercions are declared per source type with
/// [`SimpleType::with_coercion_from`]. The declared source types are the
/// coercion candidates, tried in declaration order; the first whose check
/// accepts the value selects the conversion. A value no candidate accepts is
/// returned unchanged.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use tyassert::{SimpleType, TypeHandle, Value};
///
/// let str_type = Rc::new(SimpleType::new("Str", |v| v.as_str().is_some()));
/// let hostname = SimpleType::new("Hostname", |v| {
///     v.as_str().is_some_and(|s| s.contains('.'))
/// })
/// .with_parent(str_type.clone())
/// .with_coercion_from(str_type, |v| {
///     Value::str(format!("{}.ourdomain.com", v.as_str().unwrap_or_default()))
/// });
///
/// assert!(!hostname.check(&Value::str("ftp001")).unwrap());
/// assert_eq!(
///     hostname.coerce(&Value::str("ftp001")).unwrap(),
///     Value::str("ftp001.ourdomain.com")
/// );
/// ```
pub struct SimpleType {
    name: String,
    definition: String,
    check: CheckFn,
    parent: Option<Rc<dyn TypeHandle>>,
    custom_coercion: Option<CoerceFn>,
    coercions: Vec<(Rc<dyn TypeHandle>, CoerceFn)>,
    sort: Option<SortFn>,
}

impl SimpleType {
    /// Creates a root type with an infallible predicate.
    #[must_use]
    pub fn new(name: impl Into<String>, check: impl Fn(&Value) -> bool + 'static) -> Self {
        Self::fallible(name, move |v| Ok(check(v)))
    }

    /// Creates a root type whose predicate may fault.
    #[must_use]
    pub fn fallible(
        name: impl Into<String>,
        check: impl Fn(&Value) -> Result<bool, TypeFault> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            definition: String::new(),
            check: Box::new(check),
            parent: None,
            custom_coercion: None,
            coercions: Vec::new(),
            sort: None,
        }
    }

    /// Sets the description shown as `is defined as:` in constraint traces.
    #[must_use]
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    /// Makes this type a refinement of `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: Rc<dyn TypeHandle>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Adds a coercion path from values accepted by `from`.
    #[must_use]
    pub fn with_coercion_from(
        self,
        from: Rc<dyn TypeHandle>,
        via: impl Fn(&Value) -> Value + 'static,
    ) -> Self {
        self.with_fallible_coercion_from(from, move |v| Ok(via(v)))
    }

    /// Adds a coercion path whose conversion may fault.
    #[must_use]
    pub fn with_fallible_coercion_from(
        mut self,
        from: Rc<dyn TypeHandle>,
        via: impl Fn(&Value) -> Result<Value, TypeFault> + 'static,
    ) -> Self {
        self.coercions.push((from, Box::new(via)));
        self
    }

    /// Replaces path selection with a single opaque coercion. Declared
    /// candidates, if any, are still reported for tracing.
    #[must_use]
    pub fn with_coercion(
        mut self,
        coerce: impl Fn(&Value) -> Result<Value, TypeFault> + 'static,
    ) -> Self {
        self.custom_coercion = Some(Box::new(coerce));
        self
    }

    /// Orders values with a comparator. Sorting is stable.
    #[must_use]
    pub fn with_sort_by(self, compare: impl Fn(&Value, &Value) -> Ordering + 'static) -> Self {
        self.with_sort(move |values| {
            let mut sorted = values.to_vec();
            sorted.sort_by(&compare);
            Ok(sorted)
        })
    }

    /// Orders values with an arbitrary, possibly faulting, sort.
    #[must_use]
    pub fn with_sort(
        mut self,
        sort: impl Fn(&[Value]) -> Result<Vec<Value>, TypeFault> + 'static,
    ) -> Self {
        self.sort = Some(Box::new(sort));
        self
    }
}

impl fmt::Debug for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleType")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.display_name()))
            .field("coercions", &self.coercions.len())
            .finish_non_exhaustive()
    }
}

impl TypeHandle for SimpleType {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn check(&self, value: &Value) -> Result<bool, TypeFault> {
        if let Some(parent) = &self.parent {
            if !parent.check(value)? {
                return Ok(false);
            }
        }
        (self.check)(value)
    }

    fn has_coercion(&self) -> bool {
        self.custom_coercion.is_some() || !self.coercions.is_empty()
    }

    fn coerce(&self, value: &Value) -> Result<Value, TypeFault> {
        if let Some(coerce) = &self.custom_coercion {
            return coerce(value);
        }
        if self.coercions.is_empty() {
            return Err(TypeFault::unsupported("coerce"));
        }
        for (from, via) in &self.coercions {
            if from.check(value)? {
                return via(value);
            }
        }
        Ok(value.clone())
    }

    fn parent(&self) -> Option<&dyn TypeHandle> {
        self.parent.as_deref()
    }

    fn coercion_candidates(&self) -> Vec<&dyn TypeHandle> {
        self.coercions.iter().map(|(from, _)| from.as_ref()).collect()
    }

    fn source_definition(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.definition)
    }
}

impl SortableType for SimpleType {
    fn sort(&self, values: &[Value]) -> Result<Vec<Value>, TypeFault> {
        match &self.sort {
            Some(sort) => sort(values),
            None => Err(TypeFault::unsupported("sort")),
        }
    }
}
