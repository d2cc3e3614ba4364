//! Shared behaviour-tree primitives: status algebra, blackboards, scopes and fact references.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod config;
pub mod desc;
pub mod fact_ref;
pub mod scope;
pub mod status;

pub use blackboard::{Blackboard, DictBlackboard, VmBlackboard};
pub use config::ResolverConfig;
pub use desc::{kinds, NodeDesc};
pub use fact_ref::{FactRef, ResolveError, Resolver};
pub use scope::{Scope, ScopeStack};
pub use status::Status;
