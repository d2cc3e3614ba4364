use thiserror::Error;

/// Why a node description could not be turned into a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("unknown node kind `{kind}` (label `{label}`)")]
    UnknownKind { kind: String, label: String },

    #[error("`{kind}` expects {expected} children, got {found}")]
    Arity {
        kind: String,
        expected: &'static str,
        found: usize,
    },

    #[error("`{kind}` is missing parameter #{index}")]
    MissingParam { kind: String, index: usize },

    #[error("`{kind}` parameter `{value}` is invalid: {reason}")]
    BadParam {
        kind: String,
        value: String,
        reason: String,
    },

    #[error("`Strategy` is only valid as a direct child of `Decision`")]
    StrayStrategy,

    #[error("`{0}` is a built-in node kind and cannot be registered")]
    Reserved(String),
}
