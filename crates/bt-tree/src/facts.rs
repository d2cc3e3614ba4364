use bt_core::Status;

use crate::bt::{BtNode, TickContext};

/// `Success` when the literal fact name is on the blackboard.
pub struct FactExists {
    label: String,
    fact: String,
}

impl FactExists {
    pub fn new(label: impl Into<String>, fact: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            fact: fact.into(),
        }
    }
}

impl BtNode for FactExists {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        Status::from_bool(ctx.blackboard.fact_exists(&self.fact))
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Removes the literal fact name. Always `Success`.
pub struct RemoveFact {
    label: String,
    fact: String,
}

impl RemoveFact {
    pub fn new(label: impl Into<String>, fact: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            fact: fact.into(),
        }
    }
}

impl BtNode for RemoveFact {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        ctx.blackboard.remove_fact(&self.fact);
        Status::Success
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Resolve a `(name, value)` pair of fact references, or report why not.
fn resolve_pair(
    ctx: &TickContext<'_>,
    label: &str,
    fact: &str,
    value: &str,
) -> Option<(String, String)> {
    let resolved = ctx.resolve(fact).and_then(|f| Ok((f, ctx.resolve(value)?)));
    match resolved {
        Ok(pair) => Some(pair),
        Err(err) => {
            tracing::debug!(node = label, fact, value, %err, "fact reference unresolved");
            None
        }
    }
}

/// Writes `value` under `fact`, both resolved as fact references.
///
/// Nothing is written unless both references resolve.
pub struct SetFactConst {
    label: String,
    fact: String,
    value: String,
}

impl SetFactConst {
    pub fn new(label: impl Into<String>, fact: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            fact: fact.into(),
            value: value.into(),
        }
    }
}

impl BtNode for SetFactConst {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        let Some((fact, value)) = resolve_pair(ctx, &self.label, &self.fact, &self.value) else {
            return Status::Invalid;
        };
        ctx.blackboard.set_fact(&fact, &value);
        Status::Success
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Compares the resolved fact's current value with a resolved constant.
///
/// `Invalid` when either reference fails to resolve or the fact is absent.
pub struct FactEqualsConst {
    label: String,
    fact: String,
    value: String,
}

impl FactEqualsConst {
    pub fn new(label: impl Into<String>, fact: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            fact: fact.into(),
            value: value.into(),
        }
    }
}

impl BtNode for FactEqualsConst {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        let Some((fact, expected)) = resolve_pair(ctx, &self.label, &self.fact, &self.value) else {
            return Status::Invalid;
        };
        match ctx.blackboard.get_fact(&fact) {
            Some(current) => Status::from_bool(current == expected),
            None => {
                tracing::debug!(node = %self.label, fact = %fact, "compared fact is absent");
                Status::Invalid
            }
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}
