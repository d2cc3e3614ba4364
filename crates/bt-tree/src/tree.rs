use bt_core::{kinds, Blackboard, DictBlackboard, NodeDesc, ResolverConfig, Scope, ScopeStack, Status};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bt::{BtNode, TickContext};
use crate::decision::{Decision, Strategy};
use crate::error::BuildError;
use crate::facts::{FactEqualsConst, FactExists, RemoveFact, SetFactConst};
use crate::nodes::{
    AlwaysRun, Children, Decorator, FirstReturn, Leaf, Missing, Negate, Parallel, Repeat,
    ReturnStatus, Selector, Sequence, UntilFalse, UntilTrue,
};
use crate::registry::NodeRegistry;
use crate::scope::ScopeNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeConfig {
    /// Fail the whole load when any descendant fails to build.
    ///
    /// When `false`, a child that cannot be built is replaced by a [`Missing`] node so the
    /// failure surfaces as `Invalid` from its parent at tick time instead.
    pub strict: bool,
    pub resolver: ResolverConfig,
}

/// Owns a root node, its blackboard and the scope stack, and ticks the root on demand.
pub struct Tree<B = DictBlackboard>
where
    B: Blackboard,
{
    root: Option<Box<dyn BtNode>>,
    blackboard: B,
    scopes: ScopeStack,
    registry: NodeRegistry,
    config: TreeConfig,
}

impl Tree<DictBlackboard> {
    pub fn new(registry: NodeRegistry) -> Self {
        Self::with_blackboard(registry, DictBlackboard::new())
    }
}

impl<B> Tree<B>
where
    B: Blackboard,
{
    pub fn with_blackboard(registry: NodeRegistry, blackboard: B) -> Self {
        Self {
            root: None,
            blackboard,
            scopes: ScopeStack::new(),
            registry,
            config: TreeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TreeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> TreeConfig {
        self.config
    }

    /// Build `desc` and make it the root. On failure the tree is left without a root.
    pub fn load(&mut self, desc: &NodeDesc) -> Result<(), BuildError> {
        self.root = None;
        let root = self.create_node(desc)?;
        self.root = Some(root);
        Ok(())
    }

    pub fn set_root(&mut self, root: Box<dyn BtNode>) {
        self.root = Some(root);
    }

    pub fn is_loaded(&self) -> bool {
        self.root.is_some()
    }

    /// Tick the root once. `Invalid` when nothing is loaded.
    pub fn tick(&mut self) -> Status {
        let Some(root) = self.root.as_mut() else {
            return Status::Invalid;
        };
        let mut ctx = TickContext::new(&mut self.blackboard, &mut self.scopes)
            .with_resolver(self.config.resolver);
        let status = root.tick(&mut ctx);
        tracing::trace!(root = root.label(), ?status, "tree tick");
        status
    }

    /// Forget all in-flight node state and any scopes left on the stack.
    pub fn reset(&mut self) {
        if let Some(root) = self.root.as_mut() {
            root.reset();
        }
        self.scopes.clear();
    }

    pub fn blackboard(&self) -> &B {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut B {
        &mut self.blackboard
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    pub fn push_scope(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    pub fn pop_scope(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    /// Look a variable up in the top scope.
    pub fn scoped_var(&self, name: &str) -> Option<&str> {
        self.scopes.var(name)
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut NodeRegistry {
        &mut self.registry
    }

    /// Build a node graph from a description.
    ///
    /// Built-in kinds are matched first, then registered leaves and decorators.
    pub fn create_node(&self, desc: &NodeDesc) -> Result<Box<dyn BtNode>, BuildError> {
        NodeBuilder {
            registry: &self.registry,
            strict: self.config.strict,
        }
        .build(desc)
    }
}

struct NodeBuilder<'a> {
    registry: &'a NodeRegistry,
    strict: bool,
}

impl NodeBuilder<'_> {
    fn build(&self, desc: &NodeDesc) -> Result<Box<dyn BtNode>, BuildError> {
        let label = desc.label.clone();
        let node: Box<dyn BtNode> = match desc.kind.as_str() {
            kinds::SEQUENCE => Box::new(Sequence::new(label, self.children(desc)?)),
            kinds::SELECTOR => Box::new(Selector::new(label, self.children(desc)?)),
            kinds::UNTIL_FALSE => Box::new(UntilFalse::new(label, self.children(desc)?)),
            kinds::UNTIL_TRUE => Box::new(UntilTrue::new(label, self.children(desc)?)),
            kinds::FIRST_RETURN => Box::new(FirstReturn::new(label, self.children(desc)?)),
            kinds::ALWAYS_RUN => Box::new(AlwaysRun::new(label, self.children(desc)?)),
            kinds::PARALLEL => {
                // a trailing failure threshold param is accepted and not read
                let threshold = match desc.params.first() {
                    Some(raw) => Some(parse_count(desc, raw)?),
                    None => None,
                };
                if let Some(t) = threshold {
                    if t > desc.children.len() {
                        return Err(BuildError::BadParam {
                            kind: desc.kind.clone(),
                            value: t.to_string(),
                            reason: format!("threshold exceeds {} children", desc.children.len()),
                        });
                    }
                }
                Box::new(Parallel::new(label, threshold, self.children(desc)?))
            }
            kinds::RETURN_TRUE => {
                Box::new(ReturnStatus::always_success(label, self.only_child(desc)?))
            }
            kinds::RETURN_FALSE => {
                Box::new(ReturnStatus::always_failure(label, self.only_child(desc)?))
            }
            kinds::NEGATE => Box::new(Negate::new(label, self.only_child(desc)?)),
            kinds::REPEAT => {
                let count = parse_count(desc, param(desc, 0)?)?;
                Box::new(Repeat::new(label, count, self.only_child(desc)?))
            }
            kinds::FACT_EXISTS => Box::new(FactExists::new(label, param(desc, 0)?)),
            kinds::REMOVE_FACT => Box::new(RemoveFact::new(label, param(desc, 0)?)),
            kinds::SET_FACT_CONST => Box::new(SetFactConst::new(
                label,
                param(desc, 0)?,
                param(desc, 1)?,
            )),
            kinds::FACT_EQUALS_CONST => Box::new(FactEqualsConst::new(
                label,
                param(desc, 0)?,
                param(desc, 1)?,
            )),
            kinds::SCOPE => {
                let bindings = desc
                    .params
                    .iter()
                    .map(|p| parse_binding(desc, p))
                    .collect::<Result<Vec<_>, _>>()?;
                Box::new(ScopeNode::new(label, bindings, self.only_child(desc)?))
            }
            kinds::DECISION => {
                let strategies = desc
                    .children
                    .iter()
                    .map(|c| self.strategy(c))
                    .collect::<Result<Vec<_>, _>>()?;
                Box::new(Decision::new(label, strategies))
            }
            kinds::STRATEGY => return Err(BuildError::StrayStrategy),
            other => {
                if let Some(tick) = self.registry.leaf(other) {
                    expect_children(desc, 0, "no")?;
                    Box::new(Leaf::new(label, tick, desc.params.clone()))
                } else if let Some(filter) = self.registry.decorator(other) {
                    Box::new(Decorator::new(
                        label,
                        filter,
                        self.only_child(desc)?,
                        desc.params.clone(),
                    ))
                } else {
                    return Err(BuildError::UnknownKind {
                        kind: desc.kind.clone(),
                        label: desc.label.clone(),
                    });
                }
            }
        };
        Ok(node)
    }

    fn child(&self, desc: &NodeDesc) -> Result<Box<dyn BtNode>, BuildError> {
        match self.build(desc) {
            Ok(node) => Ok(node),
            Err(err) if !self.strict => {
                tracing::warn!(kind = %desc.kind, label = %desc.label, %err, "child replaced by an invalid placeholder");
                Ok(Box::new(Missing::new(desc.label.clone(), err.to_string())))
            }
            Err(err) => Err(err),
        }
    }

    fn children(&self, desc: &NodeDesc) -> Result<Children, BuildError> {
        desc.children.iter().map(|c| self.child(c)).collect()
    }

    fn only_child(&self, desc: &NodeDesc) -> Result<Box<dyn BtNode>, BuildError> {
        expect_children(desc, 1, "exactly one")?;
        self.child(&desc.children[0])
    }

    fn strategy(&self, desc: &NodeDesc) -> Result<Strategy, BuildError> {
        if desc.kind != kinds::STRATEGY {
            return Err(BuildError::BadParam {
                kind: kinds::DECISION.to_owned(),
                value: desc.kind.clone(),
                reason: "children must be `Strategy` nodes".to_owned(),
            });
        }
        expect_children(desc, 2, "two (condition, action)")?;
        Ok(Strategy::new(
            desc.label.clone(),
            self.child(&desc.children[0])?,
            self.child(&desc.children[1])?,
        ))
    }
}

fn expect_children(desc: &NodeDesc, n: usize, expected: &'static str) -> Result<(), BuildError> {
    if desc.children.len() != n {
        return Err(BuildError::Arity {
            kind: desc.kind.clone(),
            expected,
            found: desc.children.len(),
        });
    }
    Ok(())
}

fn param(desc: &NodeDesc, index: usize) -> Result<&str, BuildError> {
    desc.params
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| BuildError::MissingParam {
            kind: desc.kind.clone(),
            index,
        })
}

fn parse_count(desc: &NodeDesc, raw: &str) -> Result<usize, BuildError> {
    raw.trim().parse().map_err(|e: std::num::ParseIntError| BuildError::BadParam {
        kind: desc.kind.clone(),
        value: raw.to_owned(),
        reason: e.to_string(),
    })
}

/// `local=factRef`
fn parse_binding(desc: &NodeDesc, raw: &str) -> Result<(String, String), BuildError> {
    match raw.split_once('=') {
        Some((local, fact_ref)) if !local.is_empty() => {
            Ok((local.to_owned(), fact_ref.to_owned()))
        }
        _ => Err(BuildError::BadParam {
            kind: desc.kind.clone(),
            value: raw.to_owned(),
            reason: "expected `local=factRef`".to_owned(),
        }),
    }
}
