use bt_core::{Scope, Status};

use crate::bt::{BtNode, TickContext};

/// Binds local variables for the duration of its child's tick.
///
/// Every binding is resolved before anything is pushed; one failure makes the node `Invalid`
/// and leaves the scope stack untouched. The child sees the new scope as the only visible one.
pub struct ScopeNode {
    label: String,
    bindings: Vec<(String, String)>,
    child: Box<dyn BtNode>,
}

impl ScopeNode {
    pub fn new(
        label: impl Into<String>,
        bindings: Vec<(String, String)>,
        child: Box<dyn BtNode>,
    ) -> Self {
        Self {
            label: label.into(),
            bindings,
            child,
        }
    }

    fn bind(&self, ctx: &TickContext<'_>) -> Option<Scope> {
        let mut vars = Vec::with_capacity(self.bindings.len());
        for (local, fact_ref) in &self.bindings {
            match ctx.resolve(fact_ref) {
                Ok(value) => vars.push((local.as_str(), value)),
                Err(err) => {
                    tracing::debug!(node = %self.label, local = %local, %err, "scope binding unresolved");
                    return None;
                }
            }
        }
        Some(vars.into_iter().collect())
    }
}

impl BtNode for ScopeNode {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        let Some(scope) = self.bind(ctx) else {
            return Status::Invalid;
        };
        let child = &mut self.child;
        ctx.with_scope(scope, |ctx| child.tick(ctx))
    }

    fn reset(&mut self) {
        self.child.reset();
    }

    fn label(&self) -> &str {
        &self.label
    }
}
