/// Instruction set. Every opcode occupies one slot, followed by `width() - 1` operand slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum Op {
    /// `run leaf`: call a leaf callback.
    Run = 0,
    /// `run_thread thread`: drive another thread until it finishes or yields.
    RunThread = 1,
    /// `run_decorator decorator`: call a decorator callback on the current status.
    RunDecorator = 2,
    /// `branch_if_failure offset`
    BranchIfFailure = 3,
    /// `branch_if_success offset`
    BranchIfSuccess = 4,
    SetFailure = 5,
    SetSuccess = 6,
    Negate = 7,
    /// `check_fact string`
    CheckFact = 8,
    /// `remove_fact string`
    RemoveFact = 9,
    DebugBreak = 10,
    /// `log string`
    Log = 11,
}

impl Op {
    pub const ALL: [Op; 12] = [
        Op::Run,
        Op::RunThread,
        Op::RunDecorator,
        Op::BranchIfFailure,
        Op::BranchIfSuccess,
        Op::SetFailure,
        Op::SetSuccess,
        Op::Negate,
        Op::CheckFact,
        Op::RemoveFact,
        Op::DebugBreak,
        Op::Log,
    ];

    pub fn decode(raw: i16) -> Option<Op> {
        usize::try_from(raw).ok().and_then(|i| Op::ALL.get(i).copied())
    }

    pub fn code(self) -> i16 {
        self as i16
    }

    /// Slots taken by the opcode and its operand.
    pub fn width(self) -> usize {
        match self {
            Op::SetFailure | Op::SetSuccess | Op::Negate | Op::DebugBreak => 1,
            _ => 2,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Run => "run",
            Op::RunThread => "run_thread",
            Op::RunDecorator => "run_decorator",
            Op::BranchIfFailure => "branch_if_failure",
            Op::BranchIfSuccess => "branch_if_success",
            Op::SetFailure => "set_failure",
            Op::SetSuccess => "set_success",
            Op::Negate => "negate",
            Op::CheckFact => "check_fact",
            Op::RemoveFact => "remove_fact",
            Op::DebugBreak => "debug_break",
            Op::Log => "log",
        }
    }
}

impl TryFrom<i16> for Op {
    type Error = i16;

    fn try_from(raw: i16) -> Result<Self, Self::Error> {
        Op::decode(raw).ok_or(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::Op;

    #[test]
    fn decode_is_inverse_of_code() {
        for op in Op::ALL {
            assert_eq!(Op::decode(op.code()), Some(op));
        }
        assert_eq!(Op::decode(-1), None);
        assert_eq!(Op::decode(12), None);
        assert_eq!(Op::try_from(99), Err(99));
    }

    #[test]
    fn opcodes_are_numbered_in_declaration_order() {
        for (i, op) in Op::ALL.iter().enumerate() {
            assert_eq!(op.code() as usize, i, "{}", op.mnemonic());
        }
    }
}
