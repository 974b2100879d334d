//! Values under test.
//!
//! A [`Value`] is either a scalar or a [`Reference`] to a shared composite.
//! References carry identity: two references may hold equal contents yet be
//! distinct instances, which is what the coercion identity comparator relies
//! on. Because references are interior-mutable, callers can build circular
//! structures; everything in this crate that walks values terminates on them.
//!
//! `PartialEq` on [`Value`] is deep (structural) equality. Identity is a
//! separate question answered by [`crate::identity::changed`].

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// An arbitrary data item under test.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The absent value.
    #[default]
    Undef,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Num(f64),
    /// A string.
    Str(String),
    /// A reference to a shared composite.
    Ref(Reference),
}

/// The contents behind a [`Reference`].
#[derive(Debug, Clone)]
pub enum Composite {
    /// An ordered list.
    List(Vec<Value>),
    /// A string-keyed map.
    Map(BTreeMap<String, Value>),
    /// A named record, e.g. an instance of a class.
    Object {
        /// Class name of the instance.
        class: String,
        /// Instance fields.
        fields: BTreeMap<String, Value>,
    },
}

/// A shared, identity-bearing handle to a [`Composite`].
///
/// Cloning a `Reference` yields the same instance, not a copy.
#[derive(Clone)]
pub struct Reference(Rc<RefCell<Composite>>);

impl Reference {
    /// Wraps a composite in a fresh reference.
    #[must_use]
    pub fn new(composite: Composite) -> Self {
        Self(Rc::new(RefCell::new(composite)))
    }

    /// Borrows the composite.
    ///
    /// # Panics
    ///
    /// Panics if the composite is currently mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, Composite> {
        self.0.borrow()
    }

    /// Borrows the composite, returning `None` while it is mutably borrowed.
    #[must_use]
    pub fn try_borrow(&self) -> Option<Ref<'_, Composite>> {
        self.0.try_borrow().ok()
    }

    /// Appends to a list. Returns `false` if the composite is not a list.
    ///
    /// This is how fixtures build self-referencing lists.
    pub fn push(&self, value: Value) -> bool {
        match &mut *self.0.borrow_mut() {
            Composite::List(items) => {
                items.push(value);
                true
            },
            _ => false,
        }
    }

    /// Inserts into a map or object. Returns `false` for lists.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> bool {
        match &mut *self.0.borrow_mut() {
            Composite::Map(entries) | Composite::Object { fields: entries, .. } => {
                entries.insert(key.into(), value);
                true
            },
            Composite::List(_) => false,
        }
    }

    /// Returns `true` if both handles point at the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the underlying instance, stable for its lifetime.
    #[must_use]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl fmt::Debug for Reference {
    // Contents are omitted so cyclic structures can be debug-printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({:#x})", self.addr())
    }
}

impl Value {
    /// Creates a string value.
    #[must_use]
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// Creates a reference to a new list.
    #[must_use]
    pub fn list(items: impl IntoIterator<Item = Self>) -> Self {
        Self::Ref(Reference::new(Composite::List(items.into_iter().collect())))
    }

    /// Creates a reference to a new map.
    #[must_use]
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::Ref(Reference::new(Composite::Map(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// Creates a reference to a new object of `class`.
    #[must_use]
    pub fn object<K: Into<String>>(
        class: impl Into<String>,
        fields: impl IntoIterator<Item = (K, Self)>,
    ) -> Self {
        Self::Ref(Reference::new(Composite::Object {
            class: class.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }))
    }

    /// Short name of the value's variant, or of the composite for references.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Undef => "undef",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Num(_) => "num",
            Self::Str(_) => "str",
            Self::Ref(r) => match r.try_borrow().as_deref() {
                Some(Composite::List(_)) => "list",
                Some(Composite::Map(_)) => "map",
                Some(Composite::Object { .. }) => "object",
                None => "ref",
            },
        }
    }

    /// Returns `true` for [`Value::Undef`].
    #[must_use]
    pub const fn is_undef(&self) -> bool {
        matches!(self, Self::Undef)
    }

    /// Returns `true` for references.
    #[must_use]
    pub const fn is_ref(&self) -> bool {
        matches!(self, Self::Ref(_))
    }

    /// Returns the string slice of a [`Value::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer of a [`Value::Int`].
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number of a [`Value::Num`] or [`Value::Int`].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_num(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the reference of a [`Value::Ref`].
    #[must_use]
    pub const fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Ref(r) => Some(r),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Num(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undef, Into::into)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        deep_eq(self, other, &mut Vec::new())
    }
}

/// Float equality under which every NaN equals every other NaN, so a value
/// holding NaN still equals its own clone. `0.0` and `-0.0` stay equal.
#[allow(clippy::float_cmp)]
pub(crate) fn num_eq(x: f64, y: f64) -> bool {
    x == y || (x.is_nan() && y.is_nan())
}

/// Structural equality. A pair of references already under comparison is
/// assumed equal, which makes the relation terminate on cycles.
fn deep_eq(a: &Value, b: &Value, in_progress: &mut Vec<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Undef, Value::Undef) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Num(x), Value::Num(y)) => num_eq(*x, *y),
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Ref(x), Value::Ref(y)) => {
            if x.ptr_eq(y) {
                return true;
            }
            let pair = (x.addr(), y.addr());
            if in_progress.contains(&pair) {
                return true;
            }
            in_progress.push(pair);
            let (Some(left), Some(right)) = (x.try_borrow(), y.try_borrow()) else {
                return false;
            };
            composite_eq(&left, &right, in_progress)
        },
        _ => false,
    }
}

fn composite_eq(a: &Composite, b: &Composite, in_progress: &mut Vec<(usize, usize)>) -> bool {
    match (a, b) {
        (Composite::List(x), Composite::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| deep_eq(l, r, in_progress))
        },
        (Composite::Map(x), Composite::Map(y)) => map_eq(x, y, in_progress),
        (
            Composite::Object {
                class: class_x,
                fields: x,
            },
            Composite::Object {
                class: class_y,
                fields: y,
            },
        ) => class_x == class_y && map_eq(x, y, in_progress),
        _ => false,
    }
}

fn map_eq(
    x: &BTreeMap<String, Value>,
    y: &BTreeMap<String, Value>,
    in_progress: &mut Vec<(usize, usize)>,
) -> bool {
    x.len() == y.len()
        && x.iter()
            .zip(y)
            .all(|((kx, vx), (ky, vy))| kx == ky && deep_eq(vx, vy, in_progress))
}
