//! Umbrella crate that re-exports the `bt-*` building blocks.
//!
//! `core` holds the shared vocabulary (statuses, blackboards, scopes, fact references, node
//! descriptions). `tree` walks an owned node graph; `vm` runs the same primitives as bytecode.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use bt_core as core;

#[cfg(feature = "tree")]
#[cfg_attr(docsrs, doc(cfg(feature = "tree")))]
pub use bt_tree as tree;

#[cfg(feature = "vm")]
#[cfg_attr(docsrs, doc(cfg(feature = "vm")))]
pub use bt_vm as vm;

#[cfg(feature = "core")]
pub use bt_core::{Blackboard, NodeDesc, Status};
