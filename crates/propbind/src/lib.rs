#![forbid(unsafe_code)]

//! Path-based reactive bindings between object properties.
//!
//! A property of an [`Object`] can be made *observable*; a property of
//! another object can then be *bound* to it, or to a nested path through
//! several observable objects, and follows it from then on.
//!
//! # Layers
//!
//! - **Observable registry** ([`make_observable`], [`is_observable`]): marks
//!   properties observable and intercepts their writes.
//! - **Change channel** ([`ChangeChannel`]): per-object, per-key listener
//!   lists receiving `(new, old)` on every change.
//! - **Path watcher** ([`watch`]): follows a [`PropertyPath`], re-subscribing
//!   whenever an observable link along it is replaced.
//! - **Binding manager** ([`bind`], [`dispose`]): one active source per
//!   destination key, bulk disposal per destination.
//!
//! # Execution model
//!
//! Everything is single-threaded and synchronous. A write to an observable
//! property runs the complete fan-out, including re-subscription through
//! nested paths, before [`Object::set`] returns. No batching or scheduling
//! takes place.
//!
//! # Example
//!
//! ```
//! use propbind::{Object, Value, bind, make_observable};
//!
//! let alice = Object::new();
//! make_observable(&alice, "name", "Alice");
//! let bob = Object::new();
//! make_observable(&bob, "name", "Bob");
//!
//! let app = Object::new();
//! make_observable(&app, "user", &alice);
//!
//! let label = Object::new();
//! bind(&label, "text", &app, ["user", "name"])?;
//! assert_eq!(label.get("text"), Value::from("Alice"));
//!
//! app.set("user", &bob);
//! assert_eq!(label.get("text"), Value::from("Bob"));
//!
//! alice.set("name", "Alicia");
//! assert_eq!(label.get("text"), Value::from("Bob"));
//! # Ok::<(), propbind::BindError>(())
//! ```

pub mod binding;
pub mod channel;
pub mod config;
pub mod equality;
pub mod error;
pub mod object;
pub mod path;
pub mod registry;
pub mod subscription;
pub mod value;
pub mod watch;

pub use binding::{bind, bound_keys, dispose, is_bound, unbind};
pub use channel::{ChangeChannel, Listener, ListenerToken};
pub use config::ObserveConfig;
pub use equality::{Equality, loose_eq};
pub use error::BindError;
pub use object::{Object, WeakObject};
pub use path::PropertyPath;
pub use registry::{is_observable, make_observable, make_observable_with, observable_keys};
pub use subscription::Subscription;
pub use value::Value;
pub use watch::{Watch, watch, watch_key};
