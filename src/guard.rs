//! Exclusive-section tracking for engine entry points.
//!
//! The engine calls user code (`Hash`, `Eq`) while a chain is being walked or
//! relinked. In debug builds each public engine operation opens a section and a
//! second, nested section panics naming both operations. Release builds keep
//! only the `!Send + !Sync` marker.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct ExclusiveSection {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    _single_threaded: PhantomData<*mut ()>,
}

impl ExclusiveSection {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _single_threaded: PhantomData,
        }
    }

    /// Open a section for `op`. Panics in debug builds if another section on
    /// the same engine is still open.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> SectionGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("engine re-entered by `{op}` while `{outer}` was in progress");
            }
            self.active.set(Some(op));
            SectionGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            SectionGuard { _owner: PhantomData }
        }
    }

    #[cfg(all(test, debug_assertions))]
    pub(crate) fn current(&self) -> Option<&'static str> {
        self.active.get()
    }
}

impl Default for ExclusiveSection {
    fn default() -> Self {
        Self::new()
    }
}

/// Closes its section on drop.
pub(crate) struct SectionGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ExclusiveSection,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ()>,
}

impl Drop for SectionGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}
