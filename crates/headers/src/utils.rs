//! Utility macros for the header crate.
//!
//! The validating constructors and setters of the header value types share a
//! single early-return shape, captured here by [`ensure!`]. The remaining helpers
//! back the order-insensitive equality of list-valued headers.

use std::hash::{DefaultHasher, Hash, Hasher};

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
/// Used by the validating constructors to reject values that can not be
/// expressed in the header grammar.
///
/// # Arguments
///
/// * `$predicate` - A boolean expression that should evaluate to true
/// * `$error` - The error value to return if the predicate is false
///
/// # Example
///
/// ```ignore
/// ensure!(rule::is_token(name), HeaderError::invalid_argument("invalid token"));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Multiset equality: both slices hold the same elements the same number of times,
/// in any order.
pub(crate) fn unordered_eq<T: PartialEq>(left: &[T], right: &[T]) -> bool {
    unordered_eq_by(left, right, PartialEq::eq)
}

/// Multiset equality under a custom element equality.
pub(crate) fn unordered_eq_by<T>(left: &[T], right: &[T], eq: impl Fn(&T, &T) -> bool) -> bool {
    if left.len() != right.len() {
        return false;
    }

    let mut matched = vec![false; right.len()];
    left.iter().all(|item| {
        match right.iter().enumerate().position(|(i, other)| !matched[i] && eq(item, other)) {
            Some(i) => {
                matched[i] = true;
                true
            }
            None => false,
        }
    })
}

/// Hashes the elements of `items` independently of their order.
pub(crate) fn unordered_hash<T: Hash, H: Hasher>(items: &[T], state: &mut H) {
    let combined = items.iter().fold(0u64, |acc, item| {
        let mut hasher = DefaultHasher::new();
        item.hash(&mut hasher);
        acc ^ hasher.finish()
    });
    items.len().hash(state);
    combined.hash(state);
}

/// Hashes `value` as if it was lowercased, without allocating.
pub(crate) fn hash_ignore_ascii_case<H: Hasher>(value: &str, state: &mut H) {
    for byte in value.bytes() {
        state.write_u8(byte.to_ascii_lowercase());
    }
    state.write_u8(0xff);
}
