//! Bytecode behaviour-tree VM.
//!
//! A [`Program`] is a flat `i16` instruction stream plus side tables (leaf callbacks, decorator
//! callbacks, strings) split into named thread segments. A [`Vm`] owns one resumable
//! [`VmThread`] per segment and drives them cooperatively on a single call stack: `run_thread`
//! lets one thread drive another inline, which is how parallel branches are expressed.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod compile;
pub mod error;
pub mod opcode;
pub mod program;
pub mod thread;
pub mod vm;

pub use compile::{compile, LeafFactory, LeafSet};
pub use error::{CompileError, ProgramError};
pub use opcode::Op;
pub use program::{DecoratorFn, Label, LeafFn, Program, ProgramBuilder, ThreadSegment};
pub use thread::{ThreadId, VmThread};
pub use vm::{Vm, VmConfig};

pub use bt_core::{Status, VmBlackboard};
