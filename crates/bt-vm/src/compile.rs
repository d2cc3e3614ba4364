//! Lowering of node descriptions to bytecode.
//!
//! Only the primitives that map onto straight-line code with forward branches are supported:
//! `Sequence`, `Selector`, `Negate`, `ReturnTrue`, `ReturnFalse`, `FactExists`, `RemoveFact`
//! and leaves registered in a [`LeafSet`]. For leaves that only report `Success`, `Failure` or
//! `Invalid`, the compiled program produces the same status and blackboard as the interpreter.

use std::collections::BTreeMap;

use bt_core::{kinds, NodeDesc};

use crate::error::CompileError;
use crate::program::{LeafFn, Program, ProgramBuilder};

/// Builds a fresh VM leaf for each occurrence of a kind, from that node's params.
pub type LeafFactory = Box<dyn Fn(&[String]) -> LeafFn>;

/// Leaf kinds the compiler may emit `run` for.
#[derive(Default)]
pub struct LeafSet {
    factories: BTreeMap<String, LeafFactory>,
}

impl LeafSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `kind`, replacing any previous factory.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        factory: impl Fn(&[String]) -> LeafFn + 'static,
    ) -> &mut Self {
        self.factories.insert(kind.into(), Box::new(factory));
        self
    }

    pub fn with(
        mut self,
        kind: impl Into<String>,
        factory: impl Fn(&[String]) -> LeafFn + 'static,
    ) -> Self {
        self.register(kind, factory);
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }
}

/// Compile `desc` into a single-thread program named after the root label (or `main`).
pub fn compile(desc: &NodeDesc, leaves: &LeafSet) -> Result<Program, CompileError> {
    let mut builder = ProgramBuilder::new();
    let name = if desc.label.is_empty() {
        "main"
    } else {
        desc.label.as_str()
    };
    builder.begin_thread(name);
    emit(&mut builder, desc, leaves)?;
    Ok(builder.build()?)
}

fn emit(b: &mut ProgramBuilder, desc: &NodeDesc, leaves: &LeafSet) -> Result<(), CompileError> {
    match desc.kind.as_str() {
        kinds::SEQUENCE => {
            let (last, init) = split_children(desc)?;
            let end = b.new_label();
            for child in init {
                emit(b, child, leaves)?;
                b.branch_if_failure(end);
            }
            emit(b, last, leaves)?;
            b.bind(end);
        }
        kinds::SELECTOR => {
            split_children(desc)?;
            let end = b.new_label();
            for child in &desc.children {
                emit(b, child, leaves)?;
                b.branch_if_success(end);
            }
            // a selector whose children all fail still reports success
            b.set_success();
            b.bind(end);
        }
        kinds::NEGATE => {
            emit(b, only_child(desc)?, leaves)?;
            b.negate();
        }
        kinds::RETURN_TRUE => {
            emit(b, only_child(desc)?, leaves)?;
            b.set_success();
        }
        kinds::RETURN_FALSE => {
            emit(b, only_child(desc)?, leaves)?;
            b.set_failure();
        }
        kinds::FACT_EXISTS => {
            b.check_fact(fact_param(desc)?)?;
        }
        kinds::REMOVE_FACT => {
            b.remove_fact(fact_param(desc)?)?;
        }
        other => match leaves.factories.get(other) {
            Some(factory) if desc.children.is_empty() => {
                let leaf = factory(&desc.params);
                let index = b.leaf(leaf)?;
                b.run(index);
            }
            Some(_) => {
                return Err(CompileError::Arity {
                    kind: desc.kind.clone(),
                    expected: 0,
                    found: desc.children.len(),
                })
            }
            None => return Err(CompileError::Unsupported(desc.kind.clone())),
        },
    }
    Ok(())
}

fn split_children(desc: &NodeDesc) -> Result<(&NodeDesc, &[NodeDesc]), CompileError> {
    desc.children
        .split_last()
        .ok_or_else(|| CompileError::EmptyComposite(desc.kind.clone()))
}

fn only_child(desc: &NodeDesc) -> Result<&NodeDesc, CompileError> {
    match desc.children.as_slice() {
        [child] => Ok(child),
        _ => Err(CompileError::Arity {
            kind: desc.kind.clone(),
            expected: 1,
            found: desc.children.len(),
        }),
    }
}

fn fact_param(desc: &NodeDesc) -> Result<&str, CompileError> {
    desc.params
        .first()
        .map(String::as_str)
        .ok_or_else(|| CompileError::MissingParam(desc.kind.clone()))
}
