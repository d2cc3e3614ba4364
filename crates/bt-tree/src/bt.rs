use bt_core::{Blackboard, ResolveError, Resolver, ResolverConfig, Scope, ScopeStack, Status};

/// Shared state handed to every node during one tick.
///
/// The blackboard and scope stack are borrowed from the owning [`Tree`](crate::Tree) for the
/// duration of the tick, so nodes stay reentrant and can be ticked in isolation by tests.
pub struct TickContext<'a> {
    pub blackboard: &'a mut dyn Blackboard,
    pub scopes: &'a mut ScopeStack,
    pub resolver: ResolverConfig,
}

impl<'a> TickContext<'a> {
    pub fn new(blackboard: &'a mut dyn Blackboard, scopes: &'a mut ScopeStack) -> Self {
        Self {
            blackboard,
            scopes,
            resolver: ResolverConfig::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }

    /// Resolve a `#`/`@` fact reference against the current blackboard and top scope.
    pub fn resolve(&self, raw: &str) -> Result<String, ResolveError> {
        Resolver::new(&*self.blackboard, &*self.scopes)
            .with_config(self.resolver)
            .resolve(raw)
    }

    /// Run `f` with `scope` pushed; the scope is popped again before returning.
    pub fn with_scope<R>(&mut self, scope: Scope, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scopes.push(scope);
        let out = f(self);
        self.scopes.pop();
        out
    }
}

pub trait BtNode: 'static {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status;

    /// Drop any in-flight state so the next tick starts fresh.
    fn reset(&mut self) {}

    /// Diagnostic label from the node description.
    fn label(&self) -> &str;
}
