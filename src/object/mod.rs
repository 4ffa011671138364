//! Object core: polymorphism, attributes, and shared ownership
//!
//! The crate's public kinds (Mapping, Frame, FrameSet, Region) are plain
//! value types gathered behind two capability surfaces:
//!
//! - [`Object`]: the string attribute interface every kind implements
//!   (`get_attr`/`set_attr` with typed parsing, unknown-name and
//!   read-only failures).
//! - [`WcsObject`]: the closed tagged-variant enum the channel layer uses
//!   for polymorphic serialization.
//!
//! # Sharing model
//!
//! Instances may be shared across threads through [`Shared`], an explicit
//! reference-counted handle with a per-object lock. Mutation happens under
//! the lock via [`Shared::update`]; numerically expensive read paths should
//! take a [`Shared::snapshot`] and compute outside the lock. Attribute
//! mutation on a shared object is visible to every holder, which is why
//! composite objects own independent clones of their children rather than
//! handles.

pub mod attribute;

use std::sync::{Arc, Mutex};

use crate::frame::{Frame, FrameSet};
use crate::mapping::Mapping;
use crate::region::Region;
use crate::Result;

pub use attribute::{format_float, split_indexed, AttrKind, AttrValue};

/// String attribute interface implemented by every public object kind
pub trait Object {
    /// Class name, as used by the channel type registry
    fn class_name(&self) -> &'static str;

    /// Get an attribute value; returns the default when unset
    ///
    /// Fails with `UnknownAttribute` if the name is not recognized for
    /// the concrete class.
    fn get_attr(&self, name: &str) -> Result<AttrValue>;

    /// Set an attribute from its string form
    ///
    /// Fails with `InvalidAttributeValue` on type/range mismatch and
    /// `ReadOnlyAttribute` for derived attributes.
    fn set_attr(&mut self, name: &str, value: &str) -> Result<()>;

    /// True if the attribute has an explicitly stored value (as opposed
    /// to serving its default)
    fn attr_is_set(&self, name: &str) -> bool;

    /// Return an attribute to its unset/default state
    fn clear_attr(&mut self, name: &str) -> Result<()>;
}

/// Closed set of public object kinds
///
/// This is the polymorphic currency of the channel layer: one variant per
/// serializable kind.
#[derive(Debug, Clone, PartialEq)]
pub enum WcsObject {
    Mapping(Mapping),
    Frame(Frame),
    FrameSet(FrameSet),
    Region(Region),
}

impl WcsObject {
    /// Class name of the wrapped object
    pub fn class_name(&self) -> &'static str {
        match self {
            WcsObject::Mapping(m) => m.class_name(),
            WcsObject::Frame(f) => f.class_name(),
            WcsObject::FrameSet(fs) => fs.class_name(),
            WcsObject::Region(r) => r.class_name(),
        }
    }

    /// Structural equality ignoring object identity
    pub fn same_as(&self, other: &WcsObject) -> bool {
        match (self, other) {
            (WcsObject::Mapping(a), WcsObject::Mapping(b)) => a.same_as(b),
            (WcsObject::Frame(a), WcsObject::Frame(b)) => a.same_as(b),
            (WcsObject::FrameSet(a), WcsObject::FrameSet(b)) => a.same_as(b),
            (WcsObject::Region(a), WcsObject::Region(b)) => a.same_as(b),
            _ => false,
        }
    }

    /// Borrow the attribute interface of the wrapped object
    pub fn as_object(&self) -> &dyn Object {
        match self {
            WcsObject::Mapping(m) => m,
            WcsObject::Frame(f) => f,
            WcsObject::FrameSet(fs) => fs,
            WcsObject::Region(r) => r,
        }
    }

    /// Mutably borrow the attribute interface of the wrapped object
    pub fn as_object_mut(&mut self) -> &mut dyn Object {
        match self {
            WcsObject::Mapping(m) => m,
            WcsObject::Frame(f) => f,
            WcsObject::FrameSet(fs) => fs,
            WcsObject::Region(r) => r,
        }
    }
}

impl From<Mapping> for WcsObject {
    fn from(m: Mapping) -> Self {
        WcsObject::Mapping(m)
    }
}

impl From<Frame> for WcsObject {
    fn from(f: Frame) -> Self {
        WcsObject::Frame(f)
    }
}

impl From<FrameSet> for WcsObject {
    fn from(fs: FrameSet) -> Self {
        WcsObject::FrameSet(fs)
    }
}

impl From<Region> for WcsObject {
    fn from(r: Region) -> Self {
        WcsObject::Region(r)
    }
}

/// Explicit reference-counted handle with a per-object lock
///
/// `clone_ref` acquires a reference, dropping a handle releases one, and
/// the object is destroyed when the last handle drops. All access goes
/// through the lock; use [`Shared::snapshot`] to copy the value out and
/// compute without holding it.
///
/// # Example
///
/// ```
/// use ferro_wcs::object::Shared;
/// use ferro_wcs::mapping::Mapping;
///
/// let shared = Shared::new(Mapping::zoom(2, 3.0));
/// let other = shared.clone_ref();
/// assert_eq!(shared.ref_count(), 2);
///
/// let copy = other.snapshot();
/// assert_eq!(copy.nin(), 2);
/// ```
#[derive(Debug)]
pub struct Shared<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Shared<T> {
    /// Wrap a value in a new shared handle (reference count 1)
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Acquire an additional reference to the same object
    pub fn clone_ref(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of live references to the object
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Run a closure with shared access, under the lock
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    /// Run a closure with exclusive access, under the lock
    ///
    /// The lock is held only for the duration of the closure; callers must
    /// not call back into user code from inside it.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}

impl<T: Clone> Shared<T> {
    /// Copy the value out under the lock
    ///
    /// This is the consistent-snapshot read pattern: lock, copy, release,
    /// then run expensive computation on the copy.
    pub fn snapshot(&self) -> T {
        self.with(|v| v.clone())
    }

    /// Deep-independent copy: a new object with reference count 1
    pub fn deep_clone(&self) -> Shared<T> {
        Shared::new(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Mapping;

    #[test]
    fn test_shared_ref_counting() {
        let a = Shared::new(Mapping::unit(2));
        assert_eq!(a.ref_count(), 1);

        let b = a.clone_ref();
        assert_eq!(a.ref_count(), 2);
        assert_eq!(b.ref_count(), 2);

        drop(b);
        assert_eq!(a.ref_count(), 1);
    }

    #[test]
    fn test_shared_mutation_visible_to_all_holders() {
        let a = Shared::new(Mapping::zoom(2, 2.0));
        let b = a.clone_ref();

        b.update(|m| {
            m.set_attr("ID", "scale-by-two").unwrap();
        });

        let seen = a.with(|m| m.get_attr("ID").unwrap());
        assert_eq!(seen, AttrValue::Str("scale-by-two".to_string()));
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let a = Shared::new(Mapping::zoom(2, 2.0));
        let b = a.deep_clone();
        assert_eq!(b.ref_count(), 1);

        b.update(|m| m.set_attr("ID", "copy").unwrap());
        assert!(a.with(|m| !m.attr_is_set("ID")));
    }

    #[test]
    fn test_snapshot_detaches_from_lock() {
        let a = Shared::new(Mapping::zoom(3, 1.5));
        let copy = a.snapshot();
        assert_eq!(copy.nin(), 3);
        // snapshot is a value; mutating it does not touch the original
        let mut copy = copy;
        copy.set_attr("ID", "mine").unwrap();
        assert!(a.with(|m| !m.attr_is_set("ID")));
    }

    #[test]
    fn test_wcs_object_dispatch() {
        let obj: WcsObject = Mapping::unit(2).into();
        assert_eq!(obj.class_name(), "UnitMap");
        assert!(obj.same_as(&Mapping::unit(2).into()));
        assert!(!obj.same_as(&Mapping::unit(3).into()));
    }
}
