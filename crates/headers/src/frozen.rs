//! Read-only, shareable header values.
//!
//! Header values are plain owned data, so `Clone` already is a deep copy. A
//! [`Frozen`] value wraps such a copy in an [`Arc`]: clones of the handle share
//! it, and no `&mut` access exists, so it can be handed to other threads or
//! kept in a cache without further synchronization.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::{
    CacheControl, ContentDisposition, ContentRange, Cookie, EntityTag, MediaType, NameValue, Range, RangeCondition, SetCookie,
    StringWithQuality,
};

pub struct Frozen<T>(Arc<T>);

impl<T> Frozen<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// An independent, mutable copy of the frozen value.
    pub fn to_mutable(&self) -> T
    where
        T: Clone,
    {
        T::clone(&self.0)
    }

    /// Returns true if both handles share the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Deref for Frozen<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> AsRef<T> for Frozen<T> {
    fn as_ref(&self) -> &T {
        &self.0
    }
}

impl<T> Clone for Frozen<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> From<T> for Frozen<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: PartialEq> PartialEq for Frozen<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

impl<T: Eq> Eq for Frozen<T> {}

impl<T: Hash> Hash for Frozen<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for Frozen<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Frozen").field(&self.0).finish()
    }
}

impl<T: fmt::Display> fmt::Display for Frozen<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Header values that can be frozen into a [`Frozen`] handle.
pub trait Freeze: Clone {
    /// A read-only deep copy of `self`; later changes to `self` do not show.
    fn freeze(&self) -> Frozen<Self> {
        Frozen::new(self.clone())
    }
}

impl Freeze for NameValue {}
impl Freeze for MediaType {}
impl Freeze for StringWithQuality {}
impl Freeze for CacheControl {}
impl Freeze for Range {}
impl Freeze for ContentRange {}
impl Freeze for EntityTag {}
impl Freeze for RangeCondition {}
impl Freeze for Cookie {}
impl Freeze for SetCookie {}
impl Freeze for ContentDisposition {}
