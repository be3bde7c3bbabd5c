//! Integration tests for [`Scope`] teardown ordering.

use std::sync::Arc;

use parking_lot::Mutex;
use ripple_reactive::Scope;

fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce() + Send>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let make = move |label: &'static str| {
        let sink = Arc::clone(&sink);
        Box::new(move || sink.lock().push(label)) as Box<dyn FnOnce() + Send>
    };
    (log, make)
}

/// Verifies callbacks run in registration order, exactly once.
#[test]
fn callbacks_run_in_order_once() {
    let (log, make) = recorder();
    let scope = Scope::new();
    scope.on_dispose(make("first"));
    scope.on_dispose(make("second"));

    scope.dispose();
    scope.dispose();

    assert_eq!(*log.lock(), vec!["first", "second"]);
    assert!(scope.is_disposed());
}

/// Verifies children are torn down before the parent's own callbacks.
#[test]
fn children_dispose_before_parent_callbacks() {
    let (log, make) = recorder();
    let parent = Scope::new();
    parent.on_dispose(make("parent"));

    let child = parent.child();
    child.on_dispose(make("child"));

    parent.dispose();

    assert_eq!(*log.lock(), vec!["child", "parent"]);
    assert!(child.is_disposed());
}

/// Verifies dropping the last handle disposes the scope.
#[test]
fn dropping_last_handle_disposes() {
    let (log, make) = recorder();
    let scope = Scope::new();
    let other = scope.clone();
    scope.on_dispose(make("dropped"));

    drop(scope);
    assert!(log.lock().is_empty());

    drop(other);
    assert_eq!(*log.lock(), vec!["dropped"]);
}

/// Verifies a panicking callback does not block the rest.
#[test]
fn panicking_callback_does_not_block_others() {
    let (log, make) = recorder();
    let scope = Scope::new();
    scope.on_dispose(|| panic!("teardown failure"));
    scope.on_dispose(make("after"));

    scope.dispose();

    assert_eq!(*log.lock(), vec!["after"]);
}
