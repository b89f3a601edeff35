//! Observable property registry.
//!
//! [`make_observable`] replaces a property's slot with an [`Accessor`]: a
//! value cell plus the comparison-and-publish logic that runs on every
//! write. [`is_observable`] reports whether a slot holds an accessor.
//!
//! # Invariants
//!
//! 1. Reading an observable property returns the last value stored by a
//!    write that counted as a change (or the initial value).
//! 2. A write publishes `(new, old)` on the owning object's channel iff the
//!    accessor's [`Equality`] policy says the values differ.
//! 3. Making a property observable again installs a fresh cell holding the
//!    new initial value without publishing; listeners already registered for
//!    that key stay registered.

use std::cell::RefCell;

use tracing::trace;

use crate::config::ObserveConfig;
use crate::equality::Equality;
use crate::object::{Object, Slot};
use crate::value::Value;

/// Interception point installed for an observable property.
pub(crate) struct Accessor {
    value: RefCell<Value>,
    equality: Equality,
}

impl Accessor {
    fn new(initial: Value, config: ObserveConfig) -> Self {
        Self {
            value: RefCell::new(initial),
            equality: config.equality,
        }
    }

    pub(crate) fn read(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Store `value` and publish on `owner`'s channel if it is a change.
    pub(crate) fn write(&self, owner: &Object, key: &str, value: Value) {
        let old = {
            let mut current = self.value.borrow_mut();
            if self.equality.equals(&current, &value) {
                trace!(object = owner.id(), key, "write suppressed, value unchanged");
                return;
            }
            std::mem::replace(&mut *current, value.clone())
        };
        // Nobody has subscribed yet: skip creating the channel.
        if let Some(channel) = owner.existing_channel() {
            channel.publish(key, &value, &old);
        }
    }
}

/// Make `key` on `obj` observable with `initial` as its value, using the
/// default (loose) comparison policy.
pub fn make_observable(obj: &Object, key: &str, initial: impl Into<Value>) {
    make_observable_with(obj, key, initial, ObserveConfig::default());
}

/// Make `key` on `obj` observable with explicit options.
pub fn make_observable_with(
    obj: &Object,
    key: &str,
    initial: impl Into<Value>,
    config: ObserveConfig,
) {
    obj.install_accessor(key, Accessor::new(initial.into(), config));
}

/// Whether `key` on `obj` is observable.
#[must_use]
pub fn is_observable(obj: &Object, key: &str) -> bool {
    obj.with_slots(|slots| matches!(slots.get(key), Some(Slot::Observable(_))))
}

/// Names of the observable properties of `obj`, sorted.
#[must_use]
pub fn observable_keys(obj: &Object) -> Vec<String> {
    let mut keys: Vec<String> = obj.with_slots(|slots| {
        slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Observable(_)))
            .map(|(key, _)| key.clone())
            .collect()
    });
    keys.sort();
    keys
}
