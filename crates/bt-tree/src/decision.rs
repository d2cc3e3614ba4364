use bt_core::Status;

use crate::bt::{BtNode, TickContext};

/// A condition guarding an action inside a [`Decision`].
pub struct Strategy {
    label: String,
    condition: Box<dyn BtNode>,
    action: Box<dyn BtNode>,
}

impl Strategy {
    pub fn new(
        label: impl Into<String>,
        condition: Box<dyn BtNode>,
        action: Box<dyn BtNode>,
    ) -> Self {
        Self {
            label: label.into(),
            condition,
            action,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Picks the first strategy whose condition succeeds and sticks with it while its action runs.
///
/// Each tick:
/// - With a strategy in flight, only its action is ticked; the strategy is released once the
///   action stops returning `Running`.
/// - Otherwise conditions are ticked in order. `Failure` moves on; `Success` ticks that
///   strategy's action (recording it as in flight when `Running`); any other condition status
///   is returned as is.
/// - `Invalid` when no condition succeeds.
pub struct Decision {
    label: String,
    strategies: Vec<Strategy>,
    current: Option<usize>,
}

impl Decision {
    pub fn new(label: impl Into<String>, strategies: Vec<Strategy>) -> Self {
        Self {
            label: label.into(),
            strategies,
            current: None,
        }
    }

    /// Index of the strategy whose action is still running.
    pub fn in_flight(&self) -> Option<usize> {
        self.current
    }
}

impl BtNode for Decision {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        if let Some(i) = self.current {
            let status = self.strategies[i].action.tick(ctx);
            if status != Status::Running {
                self.current = None;
            }
            return status;
        }

        for (i, strategy) in self.strategies.iter_mut().enumerate() {
            match strategy.condition.tick(ctx) {
                Status::Failure => continue,
                Status::Success => {
                    let status = strategy.action.tick(ctx);
                    if status == Status::Running {
                        self.current = Some(i);
                    }
                    return status;
                }
                other => return other,
            }
        }

        Status::Invalid
    }

    fn reset(&mut self) {
        self.current = None;
        for s in self.strategies.iter_mut() {
            s.condition.reset();
            s.action.reset();
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}
