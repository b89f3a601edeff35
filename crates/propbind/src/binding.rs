//! Binding manager.
//!
//! A binding makes `dest[dest_key]` mirror the value at the end of a path
//! rooted at a source object. Bindings are owned by their destination:
//! each destination keeps a table from property name to the subscription
//! feeding it.
//!
//! # Invariants
//!
//! 1. At most one binding per `(dest, dest_key)`; binding again disposes the
//!    previous subscription before the new one is built.
//! 2. A binding holds its destination weakly and never keeps it alive.
//! 3. [`dispose`] stops every binding *into* an object. Bindings in which the
//!    object only appears as a source are unaffected: there is no reverse
//!    registry, so disposal is the destination's job.
//!
//! ```
//! use propbind::{Object, Value, bind, dispose, make_observable};
//!
//! let user = Object::new();
//! make_observable(&user, "name", "Foo");
//!
//! let dest = Object::new();
//! bind(&dest, "name", &user, ["name"])?;
//! assert_eq!(dest.get("name"), Value::from("Foo"));
//!
//! user.set("name", "Bar");
//! assert_eq!(dest.get("name"), Value::from("Bar"));
//!
//! dispose(&dest);
//! user.set("name", "Hoge");
//! assert_eq!(dest.get("name"), Value::from("Bar"));
//! # Ok::<(), propbind::BindError>(())
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use crate::error::BindError;
use crate::object::Object;
use crate::path::PropertyPath;
use crate::subscription::Subscription;
use crate::value::Value;
use crate::watch::watch;

/// Active bindings of one destination object, by destination key.
#[derive(Default)]
pub(crate) struct BindingTable {
    active: RefCell<BTreeMap<String, Subscription>>,
}

impl BindingTable {
    fn take(&self, key: &str) -> Option<Subscription> {
        self.active.borrow_mut().remove(key)
    }

    fn drain(&self) -> Vec<(String, Subscription)> {
        std::mem::take(&mut *self.active.borrow_mut())
            .into_iter()
            .collect()
    }
}

/// Bind `dest[dest_key]` to the value at `path` under `src`.
///
/// Any binding already feeding `dest_key` is disposed first. If the path
/// ends at an observable property, `dest[dest_key]` is assigned its current
/// value before this returns and follows every later change. On error the
/// key is left unbound.
pub fn bind(
    dest: &Object,
    dest_key: &str,
    src: &Object,
    path: impl Into<PropertyPath>,
) -> Result<(), BindError> {
    let watch = watch(src, path)?;
    debug!(
        dest = dest.id(),
        dest_key,
        src = src.id(),
        path = %watch.path(),
        "bind"
    );

    if let Some(previous) = dest.bindings().take(dest_key) {
        previous.dispose();
    }

    let target = dest.downgrade();
    let key = dest_key.to_owned();
    let subscription = watch.subscribe_rc(Rc::new(move |value: &Value, _old: Option<&Value>| {
        if let Some(dest) = target.upgrade() {
            dest.set(&key, value.clone());
        }
    }))?;

    // A listener reacting to the initial sync may have bound the same key
    // already. That binding wrote last, so it stays; ours is dropped.
    let superseded = {
        let mut active = dest.bindings().active.borrow_mut();
        if active.contains_key(dest_key) {
            Some(subscription)
        } else {
            active.insert(dest_key.to_owned(), subscription);
            None
        }
    };
    if let Some(subscription) = superseded {
        debug!(dest = dest.id(), dest_key, "bind superseded during initial sync");
        subscription.dispose();
    }
    Ok(())
}

/// Dispose the binding feeding `dest[dest_key]`. Returns whether one existed.
pub fn unbind(dest: &Object, dest_key: &str) -> bool {
    let Some(subscription) = dest.existing_bindings().and_then(|t| t.take(dest_key)) else {
        return false;
    };
    debug!(dest = dest.id(), dest_key, "unbind");
    subscription.dispose();
    true
}

/// Dispose every binding whose destination is `dest`, in key order, and
/// clear its binding table. Returns the number of bindings disposed.
pub fn dispose(dest: &Object) -> usize {
    let Some(table) = dest.existing_bindings() else {
        return 0;
    };
    let drained = table.drain();
    debug!(dest = dest.id(), bindings = drained.len(), "dispose bindings");
    let count = drained.len();
    for (_key, subscription) in drained {
        subscription.dispose();
    }
    count
}

/// Whether a binding currently feeds `dest[dest_key]`.
#[must_use]
pub fn is_bound(dest: &Object, dest_key: &str) -> bool {
    dest.existing_bindings()
        .is_some_and(|table| table.active.borrow().contains_key(dest_key))
}

/// Keys of `dest` fed by a binding, sorted.
#[must_use]
pub fn bound_keys(dest: &Object) -> Vec<String> {
    dest.existing_bindings()
        .map(|table| table.active.borrow().keys().cloned().collect())
        .unwrap_or_default()
}
