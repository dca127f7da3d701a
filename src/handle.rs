//! Strong-or-weak reference handles stored by the weak map.
//!
//! Rust has no tracing collector, so a weak handle here is an
//! [`std::rc::Weak`]: its referent is reclaimed exactly when the last `Rc`
//! outside the map is dropped. Expiry is therefore deterministic (no separate
//! collection cycle), but the map still observes it only by polling on access.

use core::borrow::Borrow;
use std::rc::{Rc, Weak};

/// A key or value slot that holds its referent either strongly or weakly.
pub enum RefHandle<T> {
    Strong(Rc<T>),
    Weak(Weak<T>),
}

impl<T> RefHandle<T> {
    /// Wrap `rc`, downgrading it when `weak` is set. A weak handle does not
    /// keep `rc` alive.
    pub fn new(rc: Rc<T>, weak: bool) -> Self {
        if weak {
            RefHandle::Weak(Rc::downgrade(&rc))
        } else {
            RefHandle::Strong(rc)
        }
    }

    pub fn is_weak(&self) -> bool {
        matches!(self, RefHandle::Weak(_))
    }

    /// Whether the referent can still be reached. Strong handles are always live.
    pub fn is_live(&self) -> bool {
        match self {
            RefHandle::Strong(_) => true,
            RefHandle::Weak(w) => w.strong_count() > 0,
        }
    }

    /// A strong reference to the referent while it is live.
    pub fn get(&self) -> Option<Rc<T>> {
        match self {
            RefHandle::Strong(rc) => Some(Rc::clone(rc)),
            RefHandle::Weak(w) => w.upgrade(),
        }
    }

    /// Compare the referent against `q`. A collected referent matches nothing.
    pub(crate) fn matches<Q>(&self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        match self {
            RefHandle::Strong(rc) => (**rc).borrow() == q,
            RefHandle::Weak(w) => w.upgrade().is_some_and(|rc| (*rc).borrow() == q),
        }
    }
}

impl<T> Clone for RefHandle<T> {
    fn clone(&self) -> Self {
        match self {
            RefHandle::Strong(rc) => RefHandle::Strong(Rc::clone(rc)),
            RefHandle::Weak(w) => RefHandle::Weak(Weak::clone(w)),
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for RefHandle<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RefHandle::Strong(rc) => f.debug_tuple("Strong").field(rc).finish(),
            RefHandle::Weak(w) => match w.upgrade() {
                Some(rc) => f.debug_tuple("Weak").field(&rc).finish(),
                None => f.write_str("Weak(<expired>)"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_handle_keeps_referent() {
        let rc = Rc::new("v".to_string());
        let h = RefHandle::new(Rc::clone(&rc), false);
        drop(rc);
        assert!(h.is_live());
        assert!(!h.is_weak());
        assert_eq!(h.get().as_deref().map(String::as_str), Some("v"));
    }

    #[test]
    fn weak_handle_expires_with_last_rc() {
        let rc = Rc::new(7u32);
        let h = RefHandle::new(Rc::clone(&rc), true);
        assert!(h.is_weak());
        assert!(h.is_live());
        assert_eq!(h.get().map(|v| *v), Some(7));

        drop(rc);
        assert!(!h.is_live());
        assert!(h.get().is_none());
    }

    #[test]
    fn expired_handle_matches_nothing() {
        let rc = Rc::new("k".to_string());
        let h = RefHandle::new(Rc::clone(&rc), true);
        assert!(h.matches("k"));
        assert!(!h.matches("other"));
        drop(rc);
        assert!(!h.matches("k"));
    }

    #[test]
    fn debug_reports_expiry() {
        let rc = Rc::new(1);
        let h = RefHandle::new(Rc::clone(&rc), true);
        assert_eq!(format!("{:?}", h), "Weak(1)");
        drop(rc);
        assert_eq!(format!("{:?}", h), "Weak(<expired>)");
    }
}
