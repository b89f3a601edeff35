#![forbid(unsafe_code)]

//! Disposable subscription handles.
//!
//! A [`Subscription`] owns the teardown of one or more channel
//! registrations. The teardown runs at most once: on the first call to
//! [`Subscription::dispose`], or when the handle is dropped, whichever comes
//! first.
//!
//! # Invariants
//!
//! 1. The teardown closure runs exactly once over the handle's lifetime, or
//!    never for [`Subscription::empty`].
//! 2. `dispose()` after disposal is a no-op.
//! 3. The teardown runs with no borrow of the handle held, so it may dispose
//!    other subscriptions or write observable properties.

use std::cell::RefCell;
use std::fmt;

type Teardown = Box<dyn FnOnce()>;

/// Handle to an active registration.
///
/// Dropping the handle disposes it, so a subscription that must outlive the
/// current scope has to be stored (bindings keep theirs in the destination's
/// binding table).
#[must_use = "dropping a Subscription disposes it immediately"]
pub struct Subscription {
    teardown: RefCell<Option<Teardown>>,
}

impl Subscription {
    /// The no-op subscription.
    pub const fn empty() -> Self {
        Self {
            teardown: RefCell::new(None),
        }
    }

    /// Wrap a teardown closure.
    pub(crate) fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: RefCell::new(Some(Box::new(teardown))),
        }
    }

    /// Release the registration. Safe to call more than once.
    pub fn dispose(&self) {
        let teardown = self.teardown.borrow_mut().take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }

    /// Whether the teardown has yet to run. Always `false` for
    /// [`Subscription::empty`].
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.teardown.borrow().is_some()
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::empty()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.get_mut().take() {
            teardown();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting() -> (Subscription, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let sub = Subscription::new(move || count_clone.set(count_clone.get() + 1));
        (sub, count)
    }

    #[test]
    fn dispose_runs_teardown_once() {
        let (sub, count) = counting();
        assert!(sub.is_active());

        sub.dispose();
        sub.dispose();
        assert_eq!(count.get(), 1);
        assert!(!sub.is_active());

        drop(sub);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn drop_disposes() {
        let (sub, count) = counting();
        drop(sub);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn empty_is_inert() {
        let sub = Subscription::empty();
        assert!(!sub.is_active());
        sub.dispose();
        assert!(!Subscription::default().is_active());
    }

    #[test]
    fn teardown_may_dispose_other_subscriptions() {
        let (inner, count) = counting();
        let outer = Subscription::new(move || inner.dispose());
        outer.dispose();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn debug_reports_state() {
        let (sub, _count) = counting();
        assert_eq!(format!("{sub:?}"), "Subscription { active: true }");
        sub.dispose();
        assert_eq!(format!("{sub:?}"), "Subscription { active: false }");
    }
}
