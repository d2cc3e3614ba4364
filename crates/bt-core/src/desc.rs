#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind names of the built-in nodes.
///
/// Any other kind is looked up among the leaf and decorator callbacks registered with the
/// builder.
pub mod kinds {
    pub const SEQUENCE: &str = "Sequence";
    pub const SELECTOR: &str = "Selector";
    pub const PARALLEL: &str = "Parallel";
    pub const FIRST_RETURN: &str = "FirstReturn";
    pub const ALWAYS_RUN: &str = "AlwaysRun";
    pub const UNTIL_TRUE: &str = "UntilTrue";
    pub const UNTIL_FALSE: &str = "UntilFalse";
    pub const RETURN_TRUE: &str = "ReturnTrue";
    pub const RETURN_FALSE: &str = "ReturnFalse";
    pub const NEGATE: &str = "Negate";
    pub const REPEAT: &str = "Repeat";
    pub const FACT_EXISTS: &str = "FactExists";
    pub const REMOVE_FACT: &str = "RemoveFact";
    pub const SET_FACT_CONST: &str = "SetFactConst";
    pub const FACT_EQUALS_CONST: &str = "FactEqualsConst";
    pub const SCOPE: &str = "Scope";
    pub const DECISION: &str = "Decision";
    pub const STRATEGY: &str = "Strategy";

    pub const BUILTIN: &[&str] = &[
        SEQUENCE,
        SELECTOR,
        PARALLEL,
        FIRST_RETURN,
        ALWAYS_RUN,
        UNTIL_TRUE,
        UNTIL_FALSE,
        RETURN_TRUE,
        RETURN_FALSE,
        NEGATE,
        REPEAT,
        FACT_EXISTS,
        REMOVE_FACT,
        SET_FACT_CONST,
        FACT_EQUALS_CONST,
        SCOPE,
        DECISION,
        STRATEGY,
    ];

    pub fn is_builtin(kind: &str) -> bool {
        BUILTIN.contains(&kind)
    }
}

/// Declarative description of one node and its subtree.
///
/// Descriptions are plain data: leaf and decorator behaviour is referenced by `kind` and
/// resolved against a registry when the tree is built or the program compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeDesc {
    pub kind: String,
    /// Diagnostic label; never interpreted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<NodeDesc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: Vec<String>,
}

impl NodeDesc {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeDesc>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_child(mut self, child: NodeDesc) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_params<S: Into<String>>(mut self, params: impl IntoIterator<Item = S>) -> Self {
        self.params.extend(params.into_iter().map(Into::into));
        self
    }

    pub fn leaf(kind: impl Into<String>) -> Self {
        Self::new(kind)
    }

    pub fn sequence(children: impl IntoIterator<Item = NodeDesc>) -> Self {
        Self::new(kinds::SEQUENCE).with_children(children)
    }

    pub fn selector(children: impl IntoIterator<Item = NodeDesc>) -> Self {
        Self::new(kinds::SELECTOR).with_children(children)
    }

    pub fn parallel(threshold: Option<usize>, children: impl IntoIterator<Item = NodeDesc>) -> Self {
        let node = Self::new(kinds::PARALLEL).with_children(children);
        match threshold {
            Some(t) => node.with_params([t.to_string()]),
            None => node,
        }
    }

    pub fn first_return(children: impl IntoIterator<Item = NodeDesc>) -> Self {
        Self::new(kinds::FIRST_RETURN).with_children(children)
    }

    pub fn always_run(children: impl IntoIterator<Item = NodeDesc>) -> Self {
        Self::new(kinds::ALWAYS_RUN).with_children(children)
    }

    pub fn until_true(children: impl IntoIterator<Item = NodeDesc>) -> Self {
        Self::new(kinds::UNTIL_TRUE).with_children(children)
    }

    pub fn until_false(children: impl IntoIterator<Item = NodeDesc>) -> Self {
        Self::new(kinds::UNTIL_FALSE).with_children(children)
    }

    pub fn negate(child: NodeDesc) -> Self {
        Self::new(kinds::NEGATE).with_child(child)
    }

    pub fn return_true(child: NodeDesc) -> Self {
        Self::new(kinds::RETURN_TRUE).with_child(child)
    }

    pub fn return_false(child: NodeDesc) -> Self {
        Self::new(kinds::RETURN_FALSE).with_child(child)
    }

    pub fn repeat(count: usize, child: NodeDesc) -> Self {
        Self::new(kinds::REPEAT)
            .with_params([count.to_string()])
            .with_child(child)
    }

    pub fn fact_exists(fact: impl Into<String>) -> Self {
        Self::new(kinds::FACT_EXISTS).with_params([fact.into()])
    }

    pub fn remove_fact(fact: impl Into<String>) -> Self {
        Self::new(kinds::REMOVE_FACT).with_params([fact.into()])
    }

    pub fn set_fact_const(fact: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(kinds::SET_FACT_CONST).with_params([fact.into(), value.into()])
    }

    pub fn fact_equals_const(fact: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(kinds::FACT_EQUALS_CONST).with_params([fact.into(), value.into()])
    }

    /// Scope over `child`; each binding becomes a `local=factRef` param.
    pub fn scope<K, V>(bindings: impl IntoIterator<Item = (K, V)>, child: NodeDesc) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::new(kinds::SCOPE)
            .with_params(
                bindings
                    .into_iter()
                    .map(|(k, v)| format!("{}={}", k.as_ref(), v.as_ref())),
            )
            .with_child(child)
    }

    pub fn strategy(condition: NodeDesc, action: NodeDesc) -> Self {
        Self::new(kinds::STRATEGY).with_children([condition, action])
    }

    pub fn decision(strategies: impl IntoIterator<Item = NodeDesc>) -> Self {
        Self::new(kinds::DECISION).with_children(strategies)
    }
}
