//! Property-based invariant tests for change propagation.
//!
//! 1. A write publishes exactly when the value differs under loose equality.
//! 2. Each published change carries the previous stored value as `old`.
//! 3. A bound destination always equals the source after every write.
//! 4. After `dispose`, no write to the source reaches the destination.
//! 5. Rebinding leaves exactly one listener registered per source key.
//! 6. A nested binding always reflects the currently linked object.

use propbind::{Object, Value, bind, dispose, loose_eq, make_observable, watch};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

// ── Strategies ────────────────────────────────────────────────────────────

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Undefined),
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-3i32..=3).prop_map(Value::from),
        prop::sample::select(vec!["", "0", "1", "2", "-1", "x", " 1 ", "1e0"])
            .prop_map(Value::from),
    ]
}

fn writes_strategy() -> impl Strategy<Value = Vec<Value>> {
    proptest::collection::vec(value_strategy(), 1..=24)
}

type Changes = Rc<RefCell<Vec<(Value, Value)>>>;

fn observe_changes(obj: &Object, key: &str) -> (propbind::Subscription, Changes) {
    let changes: Changes = Rc::default();
    let sink = Rc::clone(&changes);
    let sub = watch(obj, [key])
        .unwrap()
        .subscribe(move |new, old| {
            if let Some(old) = old {
                sink.borrow_mut().push((new.clone(), old.clone()));
            }
        })
        .unwrap();
    (sub, changes)
}

proptest! {
    #[test]
    fn publishes_iff_loosely_different(initial in value_strategy(), writes in writes_strategy()) {
        let obj = Object::new();
        make_observable(&obj, "v", initial.clone());
        let (_sub, changes) = observe_changes(&obj, "v");

        let mut stored = initial;
        let mut expected = Vec::new();
        for value in writes {
            if !loose_eq(&stored, &value) {
                expected.push((value.clone(), stored.clone()));
                stored = value.clone();
            }
            obj.set("v", value);
        }

        let recorded = changes.borrow().clone();
        prop_assert_eq!(recorded, expected);
        prop_assert_eq!(obj.get("v"), stored);
    }

    #[test]
    fn bound_destination_tracks_source(writes in writes_strategy()) {
        let src = Object::new();
        make_observable(&src, "v", Value::Undefined);
        let dest = Object::new();
        bind(&dest, "v", &src, ["v"]).unwrap();

        for value in writes {
            src.set("v", value);
            prop_assert_eq!(dest.get("v"), src.get("v"));
        }
    }

    #[test]
    fn disposed_destination_is_frozen(before in writes_strategy(), after in writes_strategy()) {
        let src = Object::new();
        make_observable(&src, "v", 0);
        let dest = Object::new();
        bind(&dest, "v", &src, ["v"]).unwrap();

        for value in before {
            src.set("v", value);
        }
        let frozen = dest.get("v");
        dispose(&dest);

        for value in after {
            src.set("v", value);
        }
        prop_assert_eq!(dest.get("v"), frozen);
    }

    #[test]
    fn rebinding_keeps_single_listener(rebinds in 1usize..=10) {
        let src = Object::new();
        make_observable(&src, "v", 0);
        let dest = Object::new();

        for _ in 0..rebinds {
            bind(&dest, "v", &src, ["v"]).unwrap();
        }
        prop_assert_eq!(src.listener_count("v"), 1);
        src.set("v", 1);
        prop_assert_eq!(dest.get("v"), Value::from(1));

        dispose(&dest);
        prop_assert_eq!(src.listener_count("v"), 0);
        src.set("v", 2);
        prop_assert_eq!(dest.get("v"), Value::from(1));
    }

    #[test]
    fn nested_binding_reflects_current_link(
        picks in proptest::collection::vec((0usize..3, any::<bool>(), -5i32..=5), 1..=20),
    ) {
        let users: Vec<Object> = (0..3)
            .map(|i| {
                let user = Object::new();
                make_observable(&user, "score", i);
                user
            })
            .collect();
        let app = Object::new();
        make_observable(&app, "user", &users[0]);
        let dest = Object::new();
        bind(&dest, "score", &app, ["user", "score"]).unwrap();

        let mut current = 0;
        for (index, relink, score) in picks {
            if relink {
                app.set("user", &users[index]);
                current = index;
            } else {
                users[index].set("score", score);
            }
            prop_assert_eq!(dest.get("score"), users[current].get("score"));
        }
    }
}
