//! Tree-walking behaviour-tree interpreter built on `bt-core`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod bt;
pub mod decision;
pub mod error;
pub mod facts;
pub mod nodes;
pub mod registry;
pub mod scope;
pub mod tree;

pub use bt::{BtNode, TickContext};
pub use decision::{Decision, Strategy};
pub use error::BuildError;
pub use facts::{FactEqualsConst, FactExists, RemoveFact, SetFactConst};
pub use nodes::{
    AlwaysRun, Decorator, FirstReturn, Leaf, Missing, Negate, Parallel, Repeat, ReturnStatus,
    Selector, Sequence, UntilFalse, UntilTrue,
};
pub use registry::{DecoratorFn, LeafFn, NodeRegistry};
pub use scope::ScopeNode;
pub use tree::{Tree, TreeConfig};

pub use bt_core::{Blackboard, DictBlackboard, NodeDesc, Scope, ScopeStack, Status};
