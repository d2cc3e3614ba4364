use bt_core::Status;

/// Index of a thread in declaration order. Thread 0 is the entry thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub usize);

/// Resumable execution state over one program segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmThread {
    pub(crate) pc: usize,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) current: Status,
    pub(crate) active: bool,
}

impl VmThread {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            pc: start,
            start,
            end,
            current: Status::Invalid,
            active: false,
        }
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Status produced by the last evaluated instruction.
    pub fn current(&self) -> Status {
        self.current
    }

    /// True while the thread is on the call stack, driven by a tick or a `run_thread`.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True when the pc has left the segment and the pass is complete.
    pub fn is_finished(&self) -> bool {
        self.pc >= self.end
    }

    pub(crate) fn rewind(&mut self) {
        self.pc = self.start;
    }

    pub fn reset(&mut self) {
        self.pc = self.start;
        self.current = Status::Invalid;
        self.active = false;
    }
}
