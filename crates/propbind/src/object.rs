#![forbid(unsafe_code)]

//! Property records with identity.
//!
//! An [`Object`] is a shared handle to a set of named properties. Cloning
//! the handle shares the record; two handles are the same object iff
//! [`Object::ptr_eq`] holds.
//!
//! Each property slot is either a plain value or an observable accessor
//! (see [`crate::registry`]). The object's change channel and binding table
//! are created lazily: an object that is never observed or bound carries
//! neither.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::binding::BindingTable;
use crate::channel::ChangeChannel;
use crate::registry::Accessor;
use crate::value::Value;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) enum Slot {
    Plain(Value),
    Observable(Rc<Accessor>),
}

pub(crate) struct ObjectInner {
    id: u64,
    slots: RefCell<HashMap<String, Slot>>,
    channel: OnceCell<ChangeChannel>,
    bindings: OnceCell<BindingTable>,
}

/// Shared, identity-bearing property record.
#[derive(Clone)]
pub struct Object {
    inner: Rc<ObjectInner>,
}

/// Non-owning handle to an [`Object`].
#[derive(Clone)]
pub struct WeakObject {
    inner: Weak<ObjectInner>,
}

impl Object {
    /// Create an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ObjectInner {
                id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
                slots: RefCell::new(HashMap::new()),
                channel: OnceCell::new(),
                bindings: OnceCell::new(),
            }),
        }
    }

    /// Builder form of [`Object::set`] for plain properties.
    #[must_use]
    pub fn with(self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Process-unique identity, stable for the object's lifetime.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Whether both handles refer to the same record.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakObject {
        WeakObject {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Read a property. Missing properties read as [`Value::Undefined`].
    #[must_use]
    pub fn get(&self, key: &str) -> Value {
        match self.inner.slots.borrow().get(key) {
            Some(Slot::Plain(value)) => value.clone(),
            Some(Slot::Observable(accessor)) => accessor.read(),
            None => Value::Undefined,
        }
    }

    /// Write a property.
    ///
    /// Observable properties publish `(new, old)` to this object's change
    /// channel when the write is a change under the property's equality
    /// policy. Listeners run before `set` returns.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let accessor = match self.inner.slots.borrow().get(key) {
            Some(Slot::Observable(accessor)) => Some(Rc::clone(accessor)),
            _ => None,
        };
        match accessor {
            Some(accessor) => accessor.write(self, key, value),
            None => {
                self.inner
                    .slots
                    .borrow_mut()
                    .insert(key.to_owned(), Slot::Plain(value));
            }
        }
    }

    /// Whether the property has ever been assigned or made observable.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.inner.slots.borrow().contains_key(key)
    }

    /// Property names, sorted. Observable properties are included.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.slots.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of change listeners registered for `key`.
    #[must_use]
    pub fn listener_count(&self, key: &str) -> usize {
        self.existing_channel()
            .map_or(0, |channel| channel.listener_count(key))
    }

    pub(crate) fn install_accessor(&self, key: &str, accessor: Accessor) {
        self.inner
            .slots
            .borrow_mut()
            .insert(key.to_owned(), Slot::Observable(Rc::new(accessor)));
    }

    pub(crate) fn with_slots<R>(&self, f: impl FnOnce(&HashMap<String, Slot>) -> R) -> R {
        f(&self.inner.slots.borrow())
    }

    pub(crate) fn channel(&self) -> &ChangeChannel {
        self.inner.channel.get_or_init(ChangeChannel::new)
    }

    /// The channel, if anything has subscribed or published yet.
    pub(crate) fn existing_channel(&self) -> Option<&ChangeChannel> {
        self.inner.channel.get()
    }

    pub(crate) fn bindings(&self) -> &BindingTable {
        self.inner.bindings.get_or_init(BindingTable::default)
    }

    pub(crate) fn existing_bindings(&self) -> Option<&BindingTable> {
        self.inner.bindings.get()
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Object {}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.inner.slots.borrow();
        let mut fields: Vec<(&String, &Slot)> = slots.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        let mut map = f.debug_map();
        for (key, slot) in fields {
            match slot {
                Slot::Plain(value) => map.entry(key, value),
                Slot::Observable(accessor) => map.entry(key, &accessor.read()),
            };
        }
        map.finish()?;
        write!(f, " #{}", self.inner.id)
    }
}

impl WeakObject {
    #[must_use]
    pub fn upgrade(&self) -> Option<Object> {
        self.inner.upgrade().map(|inner| Object { inner })
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(obj) => write!(f, "WeakObject(#{})", obj.id()),
            None => f.write_str("WeakObject(<dropped>)"),
        }
    }
}
