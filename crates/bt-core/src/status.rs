#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of ticking a node or stepping a VM thread.
///
/// `Invalid` reports a structural problem (missing child, unresolved fact reference, unknown
/// node kind) and is propagated by every composite before any of its own bookkeeping runs.
/// `Suspended` is only produced by the bytecode VM, when a thread yields mid-program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    #[default]
    Invalid,
    Success,
    Failure,
    Running,
    Suspended,
}

impl Status {
    /// `Success` or `Failure`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Success | Status::Failure)
    }

    pub fn is_invalid(self) -> bool {
        self == Status::Invalid
    }

    /// Swap `Success` and `Failure`; everything else passes through.
    pub fn negate(self) -> Self {
        match self {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            other => other,
        }
    }

    /// Replace a terminal status with `fixed`; everything else passes through.
    pub fn force(self, fixed: Status) -> Self {
        if self.is_terminal() {
            fixed
        } else {
            self
        }
    }

    pub fn from_bool(value: bool) -> Self {
        if value {
            Status::Success
        } else {
            Status::Failure
        }
    }
}
