use thiserror::Error;

/// Structural problems found by [`Program::validate`](crate::Program::validate) or while
/// assembling a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error("unknown opcode {raw} at {at}")]
    BadOpcode { at: usize, raw: i16 },

    #[error("instruction at {at} runs past the end of its thread")]
    Truncated { at: usize },

    #[error("{table} index {index} at {at} is out of range")]
    BadIndex {
        at: usize,
        table: &'static str,
        index: i16,
    },

    #[error("branch at {at} targets {target}, outside its thread")]
    BadBranch { at: usize, target: isize },

    #[error("thread `{name}` spans {start}..{end}, outside the program")]
    BadSegment {
        name: String,
        start: usize,
        end: usize,
    },

    #[error("branch at {at} targets {target}, which is not an instruction boundary")]
    MisalignedBranch { at: usize, target: usize },

    #[error("branch label was never bound")]
    UnboundLabel,

    #[error("too many {0} for 16-bit operands")]
    TooLarge(&'static str),
}

/// Why a node description could not be lowered to bytecode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("node kind `{0}` has no bytecode lowering")]
    Unsupported(String),

    #[error("`{0}` has no children")]
    EmptyComposite(String),

    #[error("`{kind}` expects {expected} children, got {found}")]
    Arity {
        kind: String,
        expected: usize,
        found: usize,
    },

    #[error("`{0}` is missing its fact name")]
    MissingParam(String),

    #[error(transparent)]
    Program(#[from] ProgramError),
}
