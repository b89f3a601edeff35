#![forbid(unsafe_code)]

//! Per-object change channel keyed by property name.
//!
//! # Design
//!
//! A [`ChangeChannel`] multiplexes one listener list per property name. A
//! listener receives `(new, Some(old))` on every published change. Listener
//! lists are created lazily on first subscription.
//!
//! # Invariants
//!
//! 1. Listeners for one key are invoked in registration order.
//! 2. `publish` holds no borrow while listeners run, so listeners may
//!    subscribe, unsubscribe, or write properties re-entrantly.
//! 3. A listener unsubscribed by an earlier listener of the same fan-out is
//!    not invoked; a listener subscribed during a fan-out is not invoked by
//!    that fan-out. No other listener is skipped or invoked twice.
//! 4. Publishing to a key with no listeners is a no-op.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::value::Value;

/// Change listener: `(new value, old value)`. The old value is `None` only
/// for the initial synchronous call made by a path watch.
pub type Listener = Rc<dyn Fn(&Value, Option<&Value>)>;

/// Identity of one registration on a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerToken {
    key: String,
    id: u64,
}

impl ListenerToken {
    /// The property name the listener is registered for.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

struct Registration {
    id: u64,
    /// Cleared on unsubscribe, so an in-flight fan-out can skip it.
    live: Rc<Cell<bool>>,
    listener: Listener,
}

/// Publish/subscribe channel scoped to one object.
#[derive(Default)]
pub struct ChangeChannel {
    next_id: Cell<u64>,
    topics: RefCell<HashMap<String, Vec<Registration>>>,
}

impl ChangeChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for changes of `key`.
    pub fn subscribe(&self, key: &str, listener: Listener) -> ListenerToken {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.topics
            .borrow_mut()
            .entry(key.to_owned())
            .or_default()
            .push(Registration {
                id,
                live: Rc::new(Cell::new(true)),
                listener,
            });
        ListenerToken {
            key: key.to_owned(),
            id,
        }
    }

    /// Remove a registration. Returns `false` if it was already removed.
    pub fn unsubscribe(&self, token: &ListenerToken) -> bool {
        let mut topics = self.topics.borrow_mut();
        let Some(listeners) = topics.get_mut(&token.key) else {
            return false;
        };
        let Some(index) = listeners.iter().position(|r| r.id == token.id) else {
            return false;
        };
        listeners.remove(index).live.set(false);
        if listeners.is_empty() {
            topics.remove(&token.key);
        }
        true
    }

    /// Deliver `(new, old)` to every listener of `key`. Returns the number
    /// of listeners invoked.
    pub fn publish(&self, key: &str, new: &Value, old: &Value) -> usize {
        let snapshot: Vec<(Rc<Cell<bool>>, Listener)> = match self.topics.borrow().get(key) {
            Some(listeners) => listeners
                .iter()
                .map(|r| (Rc::clone(&r.live), Rc::clone(&r.listener)))
                .collect(),
            None => return 0,
        };
        trace!(key, listeners = snapshot.len(), "publish change");

        let mut delivered = 0;
        for (live, listener) in snapshot {
            if !live.get() {
                continue;
            }
            listener(new, Some(old));
            delivered += 1;
        }
        delivered
    }

    /// Number of listeners registered for `key`.
    #[must_use]
    pub fn listener_count(&self, key: &str) -> usize {
        self.topics.borrow().get(key).map_or(0, Vec::len)
    }
}

impl fmt::Debug for ChangeChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics = self.topics.borrow();
        let mut keys: Vec<(&String, usize)> = topics.iter().map(|(k, v)| (k, v.len())).collect();
        keys.sort();
        f.debug_struct("ChangeChannel").field("listeners", &keys).finish()
    }
}
