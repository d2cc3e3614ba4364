#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use bt_tree::{NodeDesc, NodeRegistry, Status, Tree};

pub type CallLog = Rc<RefCell<Vec<String>>>;

pub fn parse_status(raw: &str) -> Status {
    match raw {
        "success" => Status::Success,
        "failure" => Status::Failure,
        "running" => Status::Running,
        _ => Status::Invalid,
    }
}

/// Registry with two recording leaves:
///
/// - `Const(status, name)` returns a fixed status.
/// - `FromFact(fact, name)` returns the status spelled by the fact's current value, so tests can
///   change a leaf's outcome between ticks.
pub fn recording_registry(log: &CallLog) -> NodeRegistry {
    let const_log = Rc::clone(log);
    let fact_log = Rc::clone(log);
    NodeRegistry::new()
        .with_leaf("Const", move |_ctx, params| {
            const_log.borrow_mut().push(params[1].clone());
            parse_status(&params[0])
        })
        .and_then(|r| {
            r.with_leaf("FromFact", move |ctx, params| {
                fact_log.borrow_mut().push(params[1].clone());
                parse_status(ctx.blackboard.get_fact(&params[0]).unwrap_or("invalid"))
            })
        })
        .expect("leaf kinds are not reserved")
}

pub fn leaf(status: &str, name: &str) -> NodeDesc {
    NodeDesc::leaf("Const").with_params([status, name])
}

pub fn fact_leaf(fact: &str, name: &str) -> NodeDesc {
    NodeDesc::leaf("FromFact").with_params([fact, name])
}

pub fn tree_with(desc: &NodeDesc) -> (Tree, CallLog) {
    let log = CallLog::default();
    let mut tree = Tree::new(recording_registry(&log));
    tree.load(desc).expect("tree builds");
    (tree, log)
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.borrow().clone()
}
