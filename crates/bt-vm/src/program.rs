use std::collections::HashMap;
use std::fmt;

use bt_core::{Status, VmBlackboard};

use crate::error::ProgramError;
use crate::opcode::Op;
use crate::thread::{ThreadId, VmThread};

/// Leaf callback. Reads the calling thread and may mutate the blackboard.
pub type LeafFn = Box<dyn FnMut(&VmThread, &mut VmBlackboard) -> Status>;

/// Decorator callback. Maps the calling thread's current status to a new one.
pub type DecoratorFn = Box<dyn FnMut(&VmThread, &mut VmBlackboard) -> Status>;

/// Named span `start..end` of the instruction stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadSegment {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// Flat bytecode plus the side tables its operands index into.
pub struct Program {
    pub(crate) code: Vec<i16>,
    pub(crate) leaves: Vec<LeafFn>,
    pub(crate) decorators: Vec<DecoratorFn>,
    pub(crate) strings: Vec<String>,
    pub(crate) threads: Vec<ThreadSegment>,
}

impl Program {
    /// Assemble a program from raw parts. Nothing is checked; see [`Program::validate`].
    pub fn from_parts(
        code: Vec<i16>,
        leaves: Vec<LeafFn>,
        decorators: Vec<DecoratorFn>,
        strings: Vec<String>,
        threads: Vec<ThreadSegment>,
    ) -> Self {
        Self {
            code,
            leaves,
            decorators,
            strings,
            threads,
        }
    }

    pub fn code(&self) -> &[i16] {
        &self.code
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn threads(&self) -> &[ThreadSegment] {
        &self.threads
    }

    pub fn thread_id(&self, name: &str) -> Option<ThreadId> {
        self.threads.iter().position(|t| t.name == name).map(ThreadId)
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn decorator_count(&self) -> usize {
        self.decorators.len()
    }

    /// Check that every thread decodes cleanly and every operand points somewhere real.
    pub fn validate(&self) -> Result<(), ProgramError> {
        for segment in &self.threads {
            if segment.start > segment.end || segment.end > self.code.len() {
                return Err(ProgramError::BadSegment {
                    name: segment.name.clone(),
                    start: segment.start,
                    end: segment.end,
                });
            }
            let mut starts = Vec::new();
            let mut branches = Vec::new();
            let mut at = segment.start;
            while at < segment.end {
                let raw = self.code[at];
                let op = Op::decode(raw).ok_or(ProgramError::BadOpcode { at, raw })?;
                if at + op.width() > segment.end {
                    return Err(ProgramError::Truncated { at });
                }
                self.check_operand(op, at, segment)?;
                if matches!(op, Op::BranchIfFailure | Op::BranchIfSuccess) {
                    branches.push((at, branch_target(at, self.code[at + 1])));
                }
                starts.push(at);
                at += op.width();
            }
            // targets are in range here; they must also land on an instruction or the end
            for (at, target) in branches {
                let target = target as usize;
                if target != segment.end && starts.binary_search(&target).is_err() {
                    return Err(ProgramError::MisalignedBranch { at, target });
                }
            }
        }
        Ok(())
    }

    fn check_operand(&self, op: Op, at: usize, segment: &ThreadSegment) -> Result<(), ProgramError> {
        let (table, len) = match op {
            Op::Run => ("leaf", self.leaves.len()),
            Op::RunDecorator => ("decorator", self.decorators.len()),
            Op::RunThread => ("thread", self.threads.len()),
            Op::CheckFact | Op::RemoveFact | Op::Log => ("string", self.strings.len()),
            Op::BranchIfFailure | Op::BranchIfSuccess => {
                let target = branch_target(at, self.code[at + 1]);
                if target < segment.start as isize || target > segment.end as isize {
                    return Err(ProgramError::BadBranch { at, target });
                }
                return Ok(());
            }
            Op::SetFailure | Op::SetSuccess | Op::Negate | Op::DebugBreak => return Ok(()),
        };
        let index = self.code[at + 1];
        match usize::try_from(index) {
            Ok(i) if i < len => Ok(()),
            _ => Err(ProgramError::BadIndex { at, table, index }),
        }
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("code", &self.code)
            .field("leaves", &self.leaves.len())
            .field("decorators", &self.decorators.len())
            .field("strings", &self.strings)
            .field("threads", &self.threads)
            .finish()
    }
}

/// Disassembly listing, one instruction per line, grouped by thread.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.threads {
            writeln!(f, "{}:", segment.name)?;
            let mut at = segment.start;
            while at < segment.end.min(self.code.len()) {
                let raw = self.code[at];
                let Some(op) = Op::decode(raw) else {
                    writeln!(f, "  {at:4}  .word {raw}")?;
                    at += 1;
                    continue;
                };
                match (op.width(), self.code.get(at + 1)) {
                    (2, Some(arg)) => match op {
                        Op::CheckFact | Op::RemoveFact | Op::Log => {
                            let s = usize::try_from(*arg).ok().and_then(|i| self.strings.get(i));
                            match s {
                                Some(s) => writeln!(f, "  {at:4}  {} {arg} ; {s:?}", op.mnemonic())?,
                                None => writeln!(f, "  {at:4}  {} {arg}", op.mnemonic())?,
                            }
                        }
                        _ => writeln!(f, "  {at:4}  {} {arg}", op.mnemonic())?,
                    },
                    _ => writeln!(f, "  {at:4}  {}", op.mnemonic())?,
                }
                at += op.width();
            }
        }
        Ok(())
    }
}

/// Forward reference to a code position, resolved when the program is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label(usize);

/// Incremental assembler for [`Program`].
///
/// Threads are numbered in the order [`begin_thread`](ProgramBuilder::begin_thread) is
/// called, so a thread may refer to a later one by its future [`ThreadId`]. Code emitted before
/// the first `begin_thread` belongs to an implicit `main` thread, which then takes index 0 and
/// shifts every named thread up by one; the id returned by `begin_thread` already accounts for
/// it.
#[derive(Default)]
pub struct ProgramBuilder {
    code: Vec<i16>,
    leaves: Vec<LeafFn>,
    decorators: Vec<DecoratorFn>,
    strings: Vec<String>,
    interned: HashMap<String, i16>,
    threads: Vec<ThreadSegment>,
    labels: Vec<Option<usize>>,
    // (operand slot, instruction position, label)
    fixups: Vec<(usize, usize, Label)>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current write position.
    pub fn position(&self) -> usize {
        self.code.len()
    }

    pub fn leaf(
        &mut self,
        f: impl FnMut(&VmThread, &mut VmBlackboard) -> Status + 'static,
    ) -> Result<i16, ProgramError> {
        let index = table_index(self.leaves.len(), "leaves")?;
        self.leaves.push(Box::new(f));
        Ok(index)
    }

    pub fn decorator(
        &mut self,
        f: impl FnMut(&VmThread, &mut VmBlackboard) -> Status + 'static,
    ) -> Result<i16, ProgramError> {
        let index = table_index(self.decorators.len(), "decorators")?;
        self.decorators.push(Box::new(f));
        Ok(index)
    }

    /// Intern `s` in the string table.
    pub fn string(&mut self, s: &str) -> Result<i16, ProgramError> {
        if let Some(&index) = self.interned.get(s) {
            return Ok(index);
        }
        let index = table_index(self.strings.len(), "strings")?;
        self.strings.push(s.to_owned());
        self.interned.insert(s.to_owned(), index);
        Ok(index)
    }

    /// Close the open thread (if any) and start a new one at the current position.
    pub fn begin_thread(&mut self, name: impl Into<String>) -> ThreadId {
        self.close_thread();
        let at = self.position();
        self.threads.push(ThreadSegment {
            name: name.into(),
            start: at,
            end: at,
        });
        ThreadId(self.threads.len() - 1)
    }

    fn close_thread(&mut self) {
        let at = self.position();
        match self.threads.last_mut() {
            Some(last) => last.end = at,
            None if at > 0 => self.threads.push(ThreadSegment {
                name: "main".to_owned(),
                start: 0,
                end: at,
            }),
            None => {}
        }
    }

    /// Emit `op` with an optional operand, exactly as given.
    pub fn emit(&mut self, op: Op, operand: Option<i16>) -> &mut Self {
        self.code.push(op.code());
        if let Some(arg) = operand {
            self.code.push(arg);
        }
        self
    }

    pub fn run(&mut self, leaf: i16) -> &mut Self {
        self.emit(Op::Run, Some(leaf))
    }

    pub fn run_thread(&mut self, thread: ThreadId) -> Result<&mut Self, ProgramError> {
        let index = table_index(thread.0, "threads")?;
        Ok(self.emit(Op::RunThread, Some(index)))
    }

    pub fn run_decorator(&mut self, decorator: i16) -> &mut Self {
        self.emit(Op::RunDecorator, Some(decorator))
    }

    pub fn set_failure(&mut self) -> &mut Self {
        self.emit(Op::SetFailure, None)
    }

    pub fn set_success(&mut self) -> &mut Self {
        self.emit(Op::SetSuccess, None)
    }

    pub fn negate(&mut self) -> &mut Self {
        self.emit(Op::Negate, None)
    }

    pub fn debug_break(&mut self) -> &mut Self {
        self.emit(Op::DebugBreak, None)
    }

    pub fn check_fact(&mut self, fact: &str) -> Result<&mut Self, ProgramError> {
        let s = self.string(fact)?;
        Ok(self.emit(Op::CheckFact, Some(s)))
    }

    pub fn remove_fact(&mut self, fact: &str) -> Result<&mut Self, ProgramError> {
        let s = self.string(fact)?;
        Ok(self.emit(Op::RemoveFact, Some(s)))
    }

    pub fn log(&mut self, message: &str) -> Result<&mut Self, ProgramError> {
        let s = self.string(message)?;
        Ok(self.emit(Op::Log, Some(s)))
    }

    pub fn new_label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    /// Bind `label` to the current position.
    pub fn bind(&mut self, label: Label) -> &mut Self {
        self.labels[label.0] = Some(self.position());
        self
    }

    pub fn branch_if_failure(&mut self, target: Label) -> &mut Self {
        self.branch(Op::BranchIfFailure, target)
    }

    pub fn branch_if_success(&mut self, target: Label) -> &mut Self {
        self.branch(Op::BranchIfSuccess, target)
    }

    fn branch(&mut self, op: Op, target: Label) -> &mut Self {
        let at = self.position();
        self.emit(op, Some(0));
        self.fixups.push((at + 1, at, target));
        self
    }

    /// Patch branch offsets, close the last thread and validate the result.
    pub fn build(mut self) -> Result<Program, ProgramError> {
        for &(slot, at, label) in &self.fixups {
            let target = self.labels[label.0].ok_or(ProgramError::UnboundLabel)?;
            let offset = target as isize - at as isize;
            self.code[slot] =
                i16::try_from(offset).map_err(|_| ProgramError::TooLarge("branch offsets"))?;
        }
        self.close_thread();

        let program = Program {
            code: self.code,
            leaves: self.leaves,
            decorators: self.decorators,
            strings: self.strings,
            threads: self.threads,
        };
        program.validate()?;
        Ok(program)
    }
}

fn branch_target(at: usize, offset: i16) -> isize {
    at as isize + isize::from(offset)
}

fn table_index(len: usize, what: &'static str) -> Result<i16, ProgramError> {
    i16::try_from(len).map_err(|_| ProgramError::TooLarge(what))
}
