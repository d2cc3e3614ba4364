use bt_core::{Blackboard, Status, VmBlackboard};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::opcode::Op;
use crate::program::Program;
use crate::thread::{ThreadId, VmThread};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VmConfig {
    /// Instructions a single thread may evaluate per tick before it is forced to yield.
    pub max_steps_per_tick: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_steps_per_tick: 4096,
        }
    }
}

/// Owns a program, one [`VmThread`] per segment, and the blackboard they share.
///
/// Malformed bytecode (a pc or operand outside its table) is a programming error and panics;
/// call [`Program::validate`] on untrusted programs first.
pub struct Vm {
    program: Program,
    threads: Vec<VmThread>,
    blackboard: VmBlackboard,
    config: VmConfig,
}

impl Vm {
    pub fn new(program: Program) -> Self {
        Self::with_blackboard(program, VmBlackboard::new())
    }

    pub fn with_blackboard(program: Program, blackboard: VmBlackboard) -> Self {
        let threads = program
            .threads
            .iter()
            .map(|s| VmThread::new(s.start, s.end))
            .collect();
        Self {
            program,
            threads,
            blackboard,
            config: VmConfig::default(),
        }
    }

    pub fn with_config(mut self, config: VmConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> VmConfig {
        self.config
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn threads(&self) -> &[VmThread] {
        &self.threads
    }

    pub fn thread(&self, id: ThreadId) -> Option<&VmThread> {
        self.threads.get(id.0)
    }

    pub fn thread_id(&self, name: &str) -> Option<ThreadId> {
        self.program.thread_id(name)
    }

    pub fn blackboard(&self) -> &VmBlackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut VmBlackboard {
        &mut self.blackboard
    }

    /// Tick the entry thread. `Invalid` for a program without threads.
    pub fn tick(&mut self) -> Status {
        if self.threads.is_empty() {
            return Status::Invalid;
        }
        self.tick_thread(ThreadId(0))
    }

    /// Run `thread` until its segment ends, it halts, or the step budget is spent.
    ///
    /// - segment end → the last status; the pc rewinds for the next pass
    /// - `Invalid` halt → `Invalid`; the pc rewinds
    /// - `Suspended` halt → `Suspended`; the pc stays so the next tick resumes there
    /// - budget spent → `Running`; the pc stays
    pub fn tick_thread(&mut self, thread: ThreadId) -> Status {
        let id = self.index(thread);
        self.run(id)
    }

    /// Evaluate one instruction of `thread`.
    ///
    /// `Running` means "keep going"; anything else is a halt with the pc left on the halting
    /// instruction. Stepping a thread whose pc has reached its segment end evaluates nothing:
    /// the pc rewinds and the last status is returned, as at the end of a tick.
    pub fn step(&mut self, thread: ThreadId) -> Status {
        let id = self.index(thread);
        let t = &mut self.threads[id];
        if t.is_finished() {
            t.rewind();
            return t.current;
        }
        self.eval(id)
    }

    /// Rewind every thread and clear their statuses. The blackboard is kept.
    pub fn reset(&mut self) {
        for t in self.threads.iter_mut() {
            t.reset();
        }
    }

    fn index(&self, thread: ThreadId) -> usize {
        if thread.0 >= self.threads.len() {
            panic!(
                "thread {} out of range ({} threads)",
                thread.0,
                self.threads.len()
            );
        }
        thread.0
    }

    fn run(&mut self, id: usize) -> Status {
        self.threads[id].active = true;
        let status = self.run_to_halt(id);
        self.threads[id].active = false;
        status
    }

    fn run_to_halt(&mut self, id: usize) -> Status {
        let mut steps = 0;
        loop {
            let thread = &mut self.threads[id];
            if thread.is_finished() {
                thread.rewind();
                return thread.current;
            }
            if steps == self.config.max_steps_per_tick {
                tracing::warn!(thread = id, pc = thread.pc, steps, "step budget exhausted");
                return Status::Running;
            }
            steps += 1;

            match self.eval(id) {
                Status::Running => {}
                Status::Invalid => {
                    let thread = &mut self.threads[id];
                    tracing::debug!(thread = id, pc = thread.pc, "thread halted invalid");
                    thread.rewind();
                    return Status::Invalid;
                }
                other => {
                    tracing::debug!(thread = id, pc = self.threads[id].pc, status = ?other, "thread yielded");
                    return other;
                }
            }
        }
    }

    fn eval(&mut self, id: usize) -> Status {
        let pc = self.threads[id].pc;
        let raw = self.fetch(pc);
        let Some(op) = Op::decode(raw) else {
            tracing::debug!(thread = id, pc, raw, "unknown opcode");
            self.threads[id].current = Status::Invalid;
            return Status::Invalid;
        };

        match op {
            Op::Run => {
                let leaf = self.operand_index(pc, self.program.leaves.len(), "leaf");
                let status = (self.program.leaves[leaf])(&self.threads[id], &mut self.blackboard);
                self.advance_or_halt(id, status, op)
            }
            Op::RunDecorator => {
                let decorator =
                    self.operand_index(pc, self.program.decorators.len(), "decorator");
                let status =
                    (self.program.decorators[decorator])(&self.threads[id], &mut self.blackboard);
                self.advance_or_halt(id, status, op)
            }
            Op::RunThread => {
                let target = self.operand_index(pc, self.threads.len(), "thread");
                let status = if self.threads[target].active {
                    tracing::warn!(thread = id, target, "re-entrant run_thread");
                    Status::Invalid
                } else {
                    match self.run(target) {
                        Status::Suspended => Status::Running,
                        other => other,
                    }
                };
                self.advance_or_halt(id, status, op)
            }
            Op::BranchIfFailure => self.branch_if(id, Status::Failure),
            Op::BranchIfSuccess => self.branch_if(id, Status::Success),
            Op::SetFailure => self.set_current(id, Status::Failure, op),
            Op::SetSuccess => self.set_current(id, Status::Success, op),
            Op::Negate => {
                let negated = self.threads[id].current.negate();
                self.set_current(id, negated, op)
            }
            Op::CheckFact => {
                let s = self.operand_index(pc, self.program.strings.len(), "string");
                let exists = self.blackboard.has_fact(&self.program.strings[s]);
                self.set_current(id, Status::from_bool(exists), op)
            }
            Op::RemoveFact => {
                let s = self.operand_index(pc, self.program.strings.len(), "string");
                self.blackboard.remove_fact(&self.program.strings[s]);
                self.set_current(id, Status::Success, op)
            }
            Op::DebugBreak => {
                tracing::debug!(thread = id, pc, current = ?self.threads[id].current, "debug break");
                self.threads[id].pc += op.width();
                Status::Running
            }
            Op::Log => {
                let s = self.operand_index(pc, self.program.strings.len(), "string");
                tracing::info!(thread = id, pc, current = ?self.threads[id].current, text = %self.program.strings[s], "vm log");
                self.threads[id].pc += op.width();
                Status::Running
            }
        }
    }

    /// Store `status`; continue past the instruction when it is `Success`, `Failure` or
    /// `Running`, halt on it otherwise.
    fn advance_or_halt(&mut self, id: usize, status: Status, op: Op) -> Status {
        let thread = &mut self.threads[id];
        thread.current = status;
        match status {
            Status::Success | Status::Failure | Status::Running => {
                thread.pc += op.width();
                Status::Running
            }
            halt => halt,
        }
    }

    fn set_current(&mut self, id: usize, status: Status, op: Op) -> Status {
        let thread = &mut self.threads[id];
        thread.current = status;
        thread.pc += op.width();
        Status::Running
    }

    fn branch_if(&mut self, id: usize, on: Status) -> Status {
        let pc = self.threads[id].pc;
        let offset = self.fetch(pc + 1);
        let thread = &mut self.threads[id];
        if thread.current == on {
            thread.pc = pc
                .checked_add_signed(isize::from(offset))
                .unwrap_or_else(|| panic!("branch at {pc} jumps before the program start"));
        } else {
            thread.pc += 2;
        }
        Status::Running
    }

    fn fetch(&self, at: usize) -> i16 {
        match self.program.code.get(at) {
            Some(word) => *word,
            None => panic!(
                "pc {at} out of bounds (program length {})",
                self.program.code.len()
            ),
        }
    }

    fn operand_index(&self, pc: usize, len: usize, table: &str) -> usize {
        let raw = self.fetch(pc + 1);
        match usize::try_from(raw) {
            Ok(i) if i < len => i,
            _ => panic!("{table} index {raw} at {pc} out of range ({len} entries)"),
        }
    }
}
