#![forbid(unsafe_code)]

//! Path watcher.
//!
//! [`watch`] follows a [`PropertyPath`] from a root object and reports the
//! value at its end to a listener, re-subscribing whenever an observable
//! link along the way is replaced.
//!
//! # Algorithm
//!
//! For a path `k :: rest` on object `obj`:
//!
//! | `k` observable | `rest` | Behavior |
//! |----------------|--------|----------|
//! | yes | empty | call `listener(current, None)`, then listen for changes of `k` |
//! | no  | empty | no-op subscription, listener never called |
//! | yes | non-empty | listen on `k`; on the current value and every change, dispose the child watch, then watch `rest` on the new value |
//! | no  | non-empty | watch `rest` on the current value of `k`, without listening on `k` |
//!
//! A non-observable link can never change under the watch, so a
//! non-observable link holding `undefined` or `null` fails with
//! [`BindError::NotAnObject`]. A primitive carries no properties: a leaf
//! read from one is silent, like any unobservable leaf, and a deeper link
//! read from one fails as `undefined`. An observable link that does not
//! hold an object yields no child until it is assigned one.
//!
//! # Invariants
//!
//! 1. When a link changes, the old child is fully disposed before the new
//!    child is built; two children never deliver to the same listener.
//! 2. Disposing a watch disposes its child, then its own key registration.
//! 3. After disposal, a change already in flight does not build a child.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::channel::{Listener, ListenerToken};
use crate::error::BindError;
use crate::object::Object;
use crate::path::PropertyPath;
use crate::registry::is_observable;
use crate::subscription::Subscription;
use crate::value::Value;

/// A validated path rooted at an object, ready to subscribe listeners.
#[derive(Clone)]
pub struct Watch {
    root: Object,
    path: PropertyPath,
}

/// Prepare a watch of `path` rooted at `root`.
///
/// Fails with [`BindError::EmptyPath`] if `path` has no segments.
pub fn watch(root: &Object, path: impl Into<PropertyPath>) -> Result<Watch, BindError> {
    let path = path.into();
    if path.is_empty() {
        return Err(BindError::EmptyPath);
    }
    Ok(Watch {
        root: root.clone(),
        path,
    })
}

/// Prepare a watch of a single observable key.
///
/// Unlike a one-segment [`watch`], a key that is not observable is an error
/// rather than a silent no-op.
pub fn watch_key(obj: &Object, key: &str) -> Result<Watch, BindError> {
    if !is_observable(obj, key) {
        return Err(BindError::NotObservable {
            key: key.to_owned(),
        });
    }
    Ok(Watch {
        root: obj.clone(),
        path: PropertyPath::new([key]),
    })
}

impl Watch {
    #[must_use]
    pub fn root(&self) -> &Object {
        &self.root
    }

    #[must_use]
    pub fn path(&self) -> &PropertyPath {
        &self.path
    }

    /// Start delivering the value at the end of the path to `listener`.
    ///
    /// If the path resolves to an observable property, `listener` is called
    /// once with `(current, None)` before this returns, and with
    /// `(new, Some(old))` on every later change.
    pub fn subscribe(
        &self,
        listener: impl Fn(&Value, Option<&Value>) + 'static,
    ) -> Result<Subscription, BindError> {
        self.subscribe_rc(Rc::new(listener))
    }

    pub(crate) fn subscribe_rc(&self, listener: Listener) -> Result<Subscription, BindError> {
        subscribe_path(&self.root, &self.path, 0, listener)
    }
}

impl fmt::Debug for Watch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watch")
            .field("root", &self.root.id())
            .field("path", &self.path)
            .finish()
    }
}

/// Watch `path[depth..]` on `obj`.
fn subscribe_path(
    obj: &Object,
    path: &PropertyPath,
    depth: usize,
    listener: Listener,
) -> Result<Subscription, BindError> {
    let key = &path.segments()[depth];
    let is_leaf = depth + 1 == path.len();

    if is_leaf {
        if !is_observable(obj, key) {
            trace!(
                object = obj.id(),
                key = key.as_str(),
                "leaf not observable, nothing to watch"
            );
            return Ok(Subscription::empty());
        }
        return Ok(subscribe_key(obj, key, listener));
    }

    if !is_observable(obj, key) {
        return match obj.get(key) {
            Value::Object(next) => subscribe_path(&next, path, depth + 1, listener),
            next @ (Value::Undefined | Value::Null) => Err(BindError::NotAnObject {
                segment: key.clone(),
                found: next.type_name(),
            }),
            next => subscribe_primitive(&next, path, depth + 1),
        };
    }

    let link = Rc::new(Link {
        path: path.clone(),
        depth,
        listener,
        child: RefCell::new(Subscription::empty()),
        generation: Cell::new(0),
        disposed: Cell::new(false),
    });
    link.attach(&obj.get(key))?;

    let on_change: Listener = {
        let link = Rc::clone(&link);
        Rc::new(move |new: &Value, _old: Option<&Value>| link.relink(new))
    };
    let token = obj.channel().subscribe(key, on_change);
    let parent = unsubscribe_on_dispose(obj, token);

    Ok(Subscription::new(move || {
        link.disposed.set(true);
        let child = link.child.replace(Subscription::empty());
        child.dispose();
        parent.dispose();
    }))
}

/// Watch `path[depth..]` on a primitive, which has no properties.
fn subscribe_primitive(
    value: &Value,
    path: &PropertyPath,
    depth: usize,
) -> Result<Subscription, BindError> {
    let key = &path.segments()[depth];
    if depth + 1 == path.len() {
        trace!(
            found = value.type_name(),
            key = key.as_str(),
            "leaf under a primitive, nothing to watch"
        );
        return Ok(Subscription::empty());
    }
    Err(BindError::NotAnObject {
        segment: key.clone(),
        found: Value::Undefined.type_name(),
    })
}

/// Call `listener` with the current value of `key`, then register it for
/// changes.
fn subscribe_key(obj: &Object, key: &str, listener: Listener) -> Subscription {
    listener(&obj.get(key), None);
    let token = obj.channel().subscribe(key, listener);
    unsubscribe_on_dispose(obj, token)
}

fn unsubscribe_on_dispose(obj: &Object, token: ListenerToken) -> Subscription {
    let weak = obj.downgrade();
    Subscription::new(move || {
        let Some(obj) = weak.upgrade() else {
            return;
        };
        if let Some(channel) = obj.existing_channel() {
            channel.unsubscribe(&token);
        }
    })
}

/// State of one observable intermediate link: the nested watch of the rest
/// of the path on the link's current value.
struct Link {
    path: PropertyPath,
    depth: usize,
    listener: Listener,
    child: RefCell<Subscription>,
    /// Bumped on every attach; detects re-entrant attaches.
    generation: Cell<u64>,
    disposed: Cell<bool>,
}

impl Link {
    /// Build the child watch for `value`, replacing the current one.
    fn attach(&self, value: &Value) -> Result<(), BindError> {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        let stale = self.child.replace(Subscription::empty());
        stale.dispose();

        let child = match value.as_object() {
            Some(next) => {
                subscribe_path(next, &self.path, self.depth + 1, Rc::clone(&self.listener))?
            }
            None => {
                debug!(
                    segment = self.path.segments()[self.depth].as_str(),
                    found = value.type_name(),
                    "observable link holds no object, waiting for assignment"
                );
                Subscription::empty()
            }
        };

        // The listener may have changed the link again, or disposed the
        // whole watch, while the child was being built.
        if self.disposed.get() || self.generation.get() != generation {
            child.dispose();
            return Ok(());
        }
        drop(self.child.replace(child));
        Ok(())
    }

    /// React to a change of the link's value.
    fn relink(&self, value: &Value) {
        if self.disposed.get() {
            return;
        }
        debug!(
            path = %self.path,
            segment = self.path.segments()[self.depth].as_str(),
            "path link changed, rebuilding watch"
        );
        if let Err(err) = self.attach(value) {
            warn!(path = %self.path, error = %err, "failed to rebuild path watch");
        }
    }
}
