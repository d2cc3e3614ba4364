#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResolverConfig {
    /// Maximum number of `#`/`@` hops followed while resolving one fact reference.
    ///
    /// Scope bindings and fact values can point back at themselves; resolution fails with
    /// [`ResolveError::TooDeep`](crate::ResolveError::TooDeep) once this many hops were taken.
    pub max_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { max_depth: 16 }
    }
}
