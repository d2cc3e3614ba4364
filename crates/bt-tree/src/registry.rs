use std::collections::BTreeMap;
use std::rc::Rc;

use bt_core::{kinds, Status};

use crate::bt::{BtNode, TickContext};
use crate::error::BuildError;

/// Leaf behaviour: receives the tick context and the node's string params.
pub type LeafFn = Rc<dyn Fn(&mut TickContext<'_>, &[String]) -> Status>;

/// Decorator behaviour: receives the tick context, the decorated child and the node's params.
pub type DecoratorFn = Rc<dyn Fn(&mut TickContext<'_>, &mut dyn BtNode, &[String]) -> Status>;

/// Named leaf and decorator callbacks that node descriptions refer to by `kind`.
#[derive(Clone, Default)]
pub struct NodeRegistry {
    leaves: BTreeMap<String, LeafFn>,
    decorators: BTreeMap<String, DecoratorFn>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_leaf(
        &mut self,
        kind: impl Into<String>,
        tick: impl Fn(&mut TickContext<'_>, &[String]) -> Status + 'static,
    ) -> Result<(), BuildError> {
        let kind = Self::check_kind(kind.into())?;
        self.decorators.remove(&kind);
        self.leaves.insert(kind, Rc::new(tick));
        Ok(())
    }

    pub fn register_decorator(
        &mut self,
        kind: impl Into<String>,
        filter: impl Fn(&mut TickContext<'_>, &mut dyn BtNode, &[String]) -> Status + 'static,
    ) -> Result<(), BuildError> {
        let kind = Self::check_kind(kind.into())?;
        self.leaves.remove(&kind);
        self.decorators.insert(kind, Rc::new(filter));
        Ok(())
    }

    /// Builder-style [`register_leaf`](Self::register_leaf).
    pub fn with_leaf(
        mut self,
        kind: impl Into<String>,
        tick: impl Fn(&mut TickContext<'_>, &[String]) -> Status + 'static,
    ) -> Result<Self, BuildError> {
        self.register_leaf(kind, tick)?;
        Ok(self)
    }

    /// Builder-style [`register_decorator`](Self::register_decorator).
    pub fn with_decorator(
        mut self,
        kind: impl Into<String>,
        filter: impl Fn(&mut TickContext<'_>, &mut dyn BtNode, &[String]) -> Status + 'static,
    ) -> Result<Self, BuildError> {
        self.register_decorator(kind, filter)?;
        Ok(self)
    }

    pub fn leaf(&self, kind: &str) -> Option<LeafFn> {
        self.leaves.get(kind).cloned()
    }

    pub fn decorator(&self, kind: &str) -> Option<DecoratorFn> {
        self.decorators.get(kind).cloned()
    }

    fn check_kind(kind: String) -> Result<String, BuildError> {
        if kinds::is_builtin(&kind) {
            return Err(BuildError::Reserved(kind));
        }
        Ok(kind)
    }
}
