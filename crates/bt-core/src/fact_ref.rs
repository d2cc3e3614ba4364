use thiserror::Error;

use crate::{Blackboard, ResolverConfig, ScopeStack};

/// Why a fact reference could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("empty fact reference")]
    Empty,

    #[error("scope variable `{0}` referenced outside of any scope")]
    NoScope(String),

    #[error("scope variable `{0}` is not bound in the current scope")]
    Unbound(String),

    #[error("indirect fact `{0}` is not on the blackboard")]
    MissingFact(String),

    #[error("fact reference nested deeper than {limit} hops")]
    TooDeep { limit: usize },
}

/// Address mode of a raw fact-name string.
///
/// - `name` is a literal fact name.
/// - `#name` names a variable of the current scope; its value is resolved again.
/// - `@name` resolves `name` to a fact name and yields that fact's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactRef<'a> {
    Literal(&'a str),
    Scoped(&'a str),
    Indirect(&'a str),
}

impl<'a> FactRef<'a> {
    pub fn parse(raw: &'a str) -> Result<Self, ResolveError> {
        if raw.is_empty() {
            return Err(ResolveError::Empty);
        }
        Ok(if let Some(var) = raw.strip_prefix('#') {
            FactRef::Scoped(var)
        } else if let Some(inner) = raw.strip_prefix('@') {
            FactRef::Indirect(inner)
        } else {
            FactRef::Literal(raw)
        })
    }
}

/// Resolves fact references against a blackboard and the active scope stack.
pub struct Resolver<'a> {
    blackboard: &'a dyn Blackboard,
    scopes: &'a ScopeStack,
    config: ResolverConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(blackboard: &'a dyn Blackboard, scopes: &'a ScopeStack) -> Self {
        Self {
            blackboard,
            scopes,
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn resolve(&self, raw: &str) -> Result<String, ResolveError> {
        self.resolve_at(raw, 0)
    }

    fn resolve_at(&self, raw: &str, depth: usize) -> Result<String, ResolveError> {
        if depth > self.config.max_depth {
            return Err(ResolveError::TooDeep {
                limit: self.config.max_depth,
            });
        }

        match FactRef::parse(raw)? {
            FactRef::Literal(name) => Ok(name.to_owned()),
            FactRef::Scoped(var) => {
                if self.scopes.is_empty() {
                    return Err(ResolveError::NoScope(var.to_owned()));
                }
                let bound = self
                    .scopes
                    .var(var)
                    .ok_or_else(|| ResolveError::Unbound(var.to_owned()))?;
                self.resolve_at(bound, depth + 1)
            }
            FactRef::Indirect(inner) => {
                let name = self.resolve_at(inner, depth + 1)?;
                self.blackboard
                    .get_fact(&name)
                    .map(str::to_owned)
                    .ok_or(ResolveError::MissingFact(name))
            }
        }
    }
}
