mod common;

use std::cell::Cell;
use std::rc::Rc;

use bt_tree::{NodeDesc, NodeRegistry, Status, Tree};
use common::{calls, leaf, parse_status, tree_with};

fn tick_wrapped(wrap: fn(NodeDesc) -> NodeDesc, child: &str) -> Status {
    let (mut tree, _log) = tree_with(&wrap(leaf(child, "child")));
    tree.tick()
}

#[test]
fn negate_swaps_terminal_statuses_only() {
    assert_eq!(tick_wrapped(NodeDesc::negate, "success"), Status::Failure);
    assert_eq!(tick_wrapped(NodeDesc::negate, "failure"), Status::Success);
    assert_eq!(tick_wrapped(NodeDesc::negate, "running"), Status::Running);
    assert_eq!(tick_wrapped(NodeDesc::negate, "invalid"), Status::Invalid);
}

#[test]
fn return_true_forces_success() {
    assert_eq!(tick_wrapped(NodeDesc::return_true, "success"), Status::Success);
    assert_eq!(tick_wrapped(NodeDesc::return_true, "failure"), Status::Success);
    assert_eq!(tick_wrapped(NodeDesc::return_true, "running"), Status::Running);
    assert_eq!(tick_wrapped(NodeDesc::return_true, "invalid"), Status::Invalid);
}

#[test]
fn return_false_forces_failure() {
    assert_eq!(tick_wrapped(NodeDesc::return_false, "success"), Status::Failure);
    assert_eq!(tick_wrapped(NodeDesc::return_false, "failure"), Status::Failure);
    assert_eq!(tick_wrapped(NodeDesc::return_false, "running"), Status::Running);
    assert_eq!(tick_wrapped(NodeDesc::return_false, "invalid"), Status::Invalid);
}

#[test]
fn repeat_ticks_child_count_times_in_one_tick() {
    let (mut tree, log) = tree_with(&NodeDesc::repeat(3, leaf("failure", "c")));
    assert_eq!(tree.tick(), Status::Failure);
    assert_eq!(calls(&log), ["c", "c", "c"]);
}

#[test]
fn repeat_stops_early_on_running_or_invalid() {
    let (mut tree, log) = tree_with(&NodeDesc::repeat(5, leaf("running", "c")));
    assert_eq!(tree.tick(), Status::Running);
    assert_eq!(calls(&log), ["c"]);

    let (mut tree, log) = tree_with(&NodeDesc::repeat(5, leaf("invalid", "c")));
    assert_eq!(tree.tick(), Status::Invalid);
    assert_eq!(calls(&log), ["c"]);
}

#[test]
fn repeat_zero_never_ticks_and_is_invalid() {
    let (mut tree, log) = tree_with(&NodeDesc::repeat(0, leaf("success", "c")));
    assert_eq!(tree.tick(), Status::Invalid);
    assert!(calls(&log).is_empty());
}

#[test]
fn registered_decorator_controls_its_child() {
    let ticks = Rc::new(Cell::new(0));
    let seen = Rc::clone(&ticks);
    let registry = NodeRegistry::new()
        .with_leaf("Flag", |_ctx, params| parse_status(&params[0]))
        .and_then(|r| {
            // Cooldown(n): tick the child only every n-th call, report Failure otherwise.
            r.with_decorator("Cooldown", move |ctx, child, params| {
                let every: u32 = params[0].parse().unwrap_or(1);
                let n = seen.get();
                seen.set(n + 1);
                if n % every == 0 {
                    child.tick(ctx)
                } else {
                    Status::Failure
                }
            })
        })
        .unwrap();

    let desc = NodeDesc::new("Cooldown")
        .with_params(["2"])
        .with_child(NodeDesc::leaf("Flag").with_params(["success"]));
    let mut tree = Tree::new(registry);
    tree.load(&desc).unwrap();

    assert_eq!(tree.tick(), Status::Success);
    assert_eq!(tree.tick(), Status::Failure);
    assert_eq!(tree.tick(), Status::Success);
    assert_eq!(ticks.get(), 3);
}
