//! Coercion identity: did a coercion actually change the value?
//!
//! The policy is explicit rather than incidental:
//!
//! - [`Value::Undef`] stands in for the empty string, so coercing `undef` to
//!   `""` (or back) is not a change
//! - if either side is a reference, the two are identical only when they are
//!   the same instance; equal contents in a new instance count as a change
//! - otherwise scalars compare by value, with NaN identical to NaN
//!
//! A coercion is allowed to be a no-op (e.g. the value is already canonical);
//! the engine uses this comparator to tell that apart from a real conversion.

use crate::value::{Value, num_eq};

/// Returns `true` if `new` is not identical to `old`, i.e. a coercion
/// occurred.
///
/// # Example
///
/// ```rust
/// use tyassert::Value;
/// use tyassert::identity::changed;
///
/// let list = Value::list([Value::Int(1)]);
/// assert!(!changed(&list, &list.clone()));
/// assert!(changed(&list, &Value::list([Value::Int(1)])));
/// assert!(!changed(&Value::Undef, &Value::str("")));
/// ```
#[must_use]
pub fn changed(old: &Value, new: &Value) -> bool {
    !identical(old, new)
}

/// Identity under the coercion policy. The negation of [`changed`].
#[must_use]
pub fn identical(old: &Value, new: &Value) -> bool {
    match (old, new) {
        (Value::Ref(a), Value::Ref(b)) => a.ptr_eq(b),
        (Value::Ref(_), _) | (_, Value::Ref(_)) => false,
        (a, b) => scalar_key(a) == scalar_key(b),
    }
}

/// Comparison key for scalars with `undef` mapped onto `""`. References
/// have no scalar key.
fn scalar_key(value: &Value) -> Option<Scalar<'_>> {
    match value {
        Value::Undef => Some(Scalar::Str("")),
        Value::Bool(b) => Some(Scalar::Bool(*b)),
        Value::Int(i) => Some(Scalar::Int(*i)),
        Value::Num(n) => Some(Scalar::Num(*n)),
        Value::Str(s) => Some(Scalar::Str(s)),
        Value::Ref(_) => None,
    }
}

enum Scalar<'a> {
    Bool(bool),
    Int(i64),
    Num(f64),
    Str(&'a str),
}

impl PartialEq for Scalar<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Num(a), Self::Num(b)) => num_eq(*a, *b),
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_undef_is_empty_string() {
        assert!(!changed(&Value::Undef, &Value::Undef));
        assert!(!changed(&Value::Undef, &Value::str("")));
        assert!(!changed(&Value::str(""), &Value::Undef));
        assert!(changed(&Value::Undef, &Value::str("x")));
        assert!(changed(&Value::Undef, &Value::Int(0)));
    }

    #[test]
    fn test_scalars_compare_by_value() {
        assert!(!changed(&Value::str("a"), &Value::str("a")));
        assert!(changed(&Value::str("a"), &Value::str("A")));
        assert!(changed(&Value::str("1"), &Value::Int(1)));
        assert!(changed(&Value::Int(1), &Value::Num(1.0)));
        assert!(!changed(&Value::Num(2.5), &Value::Num(2.5)));
    }

    #[test]
    fn test_nan_is_unchanged() {
        assert!(!changed(&Value::Num(f64::NAN), &Value::Num(f64::NAN)));
        assert!(changed(&Value::Num(f64::NAN), &Value::Num(0.0)));
        assert!(changed(&Value::Num(f64::NAN), &Value::str("NaN")));
    }

    #[test]
    fn test_references_compare_by_identity() {
        let a = Value::map([("k", Value::Int(1))]);
        let same = a.clone();
        let twin = Value::map([("k", Value::Int(1))]);
        assert!(!changed(&a, &same));
        assert!(changed(&a, &twin));
        assert_eq!(a, twin);
    }

    #[test]
    fn test_mixed_reference_and_scalar() {
        let a = Value::list([]);
        assert!(changed(&a, &Value::Undef));
        assert!(changed(&Value::str("[]"), &a));
    }

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Undef),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            any::<f64>().prop_map(Value::Num),
            Just(Value::Num(f64::NAN)),
            any::<String>().prop_map(Value::Str),
        ]
    }

    proptest! {
        /// Property: a value is never changed relative to itself or a clone.
        #[test]
        fn prop_clone_is_unchanged(value in scalar()) {
            prop_assert!(!changed(&value, &value.clone()));
        }

        /// Property: the relation is symmetric.
        #[test]
        fn prop_symmetric(a in scalar(), b in scalar()) {
            prop_assert_eq!(changed(&a, &b), changed(&b, &a));
        }

        /// Property: a fresh list wrapping a value is always a change.
        #[test]
        fn prop_wrapping_is_change(value in scalar()) {
            let wrapped = Value::list([value.clone()]);
            prop_assert!(changed(&value, &wrapped));
        }
    }
}
