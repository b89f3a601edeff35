#![forbid(unsafe_code)]

//! End-to-end binding scenarios.
//!
//! These exercise the public API only:
//! - direct property bindings
//! - nested-path bindings across link replacement
//! - exclusivity of bindings per destination key
//! - disposal of a destination's bindings

use propbind::{Object, Value, bind, dispose, is_bound, make_observable, watch};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Trace-level output by default; `RUST_LOG` narrows it.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("propbind=trace,info"));
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

fn user(name: &str, id: &str) -> Object {
    let user = Object::new();
    make_observable(&user, "name", name);
    make_observable(&user, "id", id);
    user
}

#[test]
fn bind_property() {
    init_tracing();
    let user = user("Foo", "123");

    let dest = Object::new();
    bind(&dest, "name", &user, ["name"]).unwrap();
    bind(&dest, "id", &user, ["id"]).unwrap();

    assert_eq!(dest.get("name"), Value::from("Foo"));
    assert_eq!(dest.get("id"), Value::from("123"));

    user.set("name", "Bar");
    user.set("id", "456");

    assert_eq!(dest.get("name"), Value::from("Bar"));
    assert_eq!(dest.get("id"), Value::from("456"));
}

#[test]
fn bind_property_from_nested_path() {
    init_tracing();
    let first = user("Foo", "123");
    let app = Object::new();
    make_observable(&app, "user", &first);
    let second = user("Bar", "456");

    let dest = Object::new();
    bind(&dest, "name", &app, ["user", "name"]).unwrap();
    bind(&dest, "id", &app, ["user", "id"]).unwrap();
    assert_eq!(dest.get("name"), Value::from("Foo"));
    assert_eq!(dest.get("id"), Value::from("123"));

    app.set("user", &second);
    assert_eq!(dest.get("name"), Value::from("Bar"));
    assert_eq!(dest.get("id"), Value::from("456"));

    info!("old user no longer drives the binding");
    first.set("name", "Stale");
    assert_eq!(dest.get("name"), Value::from("Bar"));

    second.set("name", "Fresh");
    assert_eq!(dest.get("name"), Value::from("Fresh"));
}

#[test]
fn bindings_are_exclusive() {
    init_tracing();
    let first = user("Foo", "123");
    let second = user("Bar", "456");

    let dest = Object::new();
    bind(&dest, "name", &first, ["name"]).unwrap();
    bind(&dest, "id", &first, ["id"]).unwrap();
    assert_eq!(dest.get("name"), Value::from("Foo"));

    bind(&dest, "name", &second, ["name"]).unwrap();
    bind(&dest, "id", &second, ["id"]).unwrap();
    assert_eq!(dest.get("name"), Value::from("Bar"));

    second.set("name", "Piyo");
    second.set("id", "222");
    first.set("name", "Hoge");
    first.set("id", "111");
    assert_eq!(dest.get("name"), Value::from("Piyo"));
    assert_eq!(dest.get("id"), Value::from("222"));
}

#[test]
fn dispose_binding_destination() {
    init_tracing();
    let user = Object::new();
    make_observable(&user, "name", "Foo");

    let dest = Object::new();
    bind(&dest, "name", &user, ["name"]).unwrap();
    assert_eq!(dest.get("name"), Value::from("Foo"));

    user.set("name", "Bar");
    assert_eq!(dest.get("name"), Value::from("Bar"));

    dispose(&dest);
    assert!(!is_bound(&dest, "name"));

    user.set("name", "Hoge");
    assert_eq!(dest.get("name"), Value::from("Bar"));
}

#[test]
fn dispose_stops_nested_bindings() {
    init_tracing();
    let first = user("Foo", "1");
    let app = Object::new();
    make_observable(&app, "user", &first);

    let dest = Object::new();
    bind(&dest, "name", &app, ["user", "name"]).unwrap();
    dispose(&dest);

    app.set("user", user("Other", "2"));
    first.set("name", "Changed");
    assert_eq!(dest.get("name"), Value::from("Foo"));
}

#[test]
fn observable_destination_republishes_bound_values() {
    init_tracing();
    let source = user("Foo", "1");
    let view = Object::new();
    make_observable(&view, "title", "");

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _sub = watch(&view, ["title"])
        .unwrap()
        .subscribe(move |new, _| sink.borrow_mut().push(new.to_string()))
        .unwrap();

    bind(&view, "title", &source, ["name"]).unwrap();
    source.set("name", "Bar");

    assert_eq!(*seen.borrow(), vec!["", "Foo", "Bar"]);
}

#[test]
fn loosely_equal_source_writes_do_not_propagate() {
    init_tracing();
    let counter = Object::new();
    make_observable(&counter, "n", 1);

    let writes = Rc::new(RefCell::new(0u32));
    let dest = Object::new();
    make_observable(&dest, "n", Value::Undefined);
    let sink = Rc::clone(&writes);
    let _sub = watch(&dest, ["n"])
        .unwrap()
        .subscribe(move |_, old| {
            if old.is_some() {
                *sink.borrow_mut() += 1;
            }
        })
        .unwrap();

    bind(&dest, "n", &counter, ["n"]).unwrap();
    assert_eq!(*writes.borrow(), 1);

    counter.set("n", "1");
    counter.set("n", 1.0);
    assert_eq!(*writes.borrow(), 1);

    counter.set("n", 2);
    assert_eq!(*writes.borrow(), 2);
    assert_eq!(dest.get("n"), Value::from(2));
}

#[test]
fn dotted_paths_bind_like_segment_lists() {
    init_tracing();
    let first = user("Foo", "1");
    let app = Object::new();
    make_observable(&app, "user", &first);

    let dest = Object::new();
    bind(
        &dest,
        "name",
        &app,
        propbind::PropertyPath::parse_dotted("user.name"),
    )
    .unwrap();
    assert_eq!(dest.get("name"), Value::from("Foo"));
}
