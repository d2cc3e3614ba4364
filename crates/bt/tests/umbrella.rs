#![cfg(all(feature = "tree", feature = "vm"))]

use bt::tree::{NodeRegistry, Tree};
use bt::vm::{compile, LeafSet, Vm};
use bt::{Blackboard, NodeDesc, Status};

#[test]
fn one_description_drives_both_engines() {
    let desc = NodeDesc::selector([
        NodeDesc::fact_exists("alarm"),
        NodeDesc::negate(NodeDesc::fact_exists("quiet")),
    ]);

    let mut tree = Tree::new(NodeRegistry::new());
    tree.load(&desc).unwrap();
    tree.blackboard_mut().set_fact("quiet", "yes");

    let mut vm = Vm::new(compile(&desc, &LeafSet::new()).unwrap());
    vm.blackboard_mut().set_fact("quiet", "yes");

    assert_eq!(tree.tick(), Status::Success, "all-failure selector succeeds");
    assert_eq!(vm.tick(), tree.tick());
}

#[cfg(feature = "serde")]
#[test]
fn descriptions_load_from_json() {
    let desc: NodeDesc = serde_json::from_str(
        r#"{ "kind": "Sequence", "children": [{ "kind": "FactExists", "params": ["door"] }] }"#,
    )
    .unwrap();
    let mut tree = Tree::new(NodeRegistry::new());
    tree.load(&desc).unwrap();
    assert_eq!(tree.tick(), Status::Failure);
}
