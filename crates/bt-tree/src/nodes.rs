use bt_core::Status;

use crate::bt::{BtNode, TickContext};
use crate::registry::{DecoratorFn, LeafFn};

pub type Children = Vec<Box<dyn BtNode>>;

/// Tick children in order while they return `proceed`.
///
/// Returns the first other status, `None` when every child proceeded, and `Invalid` for an empty
/// child list.
fn tick_while(children: &mut Children, ctx: &mut TickContext<'_>, proceed: Status) -> Option<Status> {
    if children.is_empty() {
        return Some(Status::Invalid);
    }
    for child in children.iter_mut() {
        let status = child.tick(ctx);
        if status != proceed {
            return Some(status);
        }
    }
    None
}

fn reset_all(children: &mut Children) {
    for c in children.iter_mut() {
        c.reset();
    }
}

/// Runs children while they succeed; returns the first non-`Success` status.
pub struct Sequence {
    label: String,
    children: Children,
}

impl Sequence {
    pub fn new(label: impl Into<String>, children: Children) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

impl BtNode for Sequence {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        tick_while(&mut self.children, ctx, Status::Success).unwrap_or(Status::Success)
    }

    fn reset(&mut self) {
        reset_all(&mut self.children);
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Runs children while they fail; returns the first non-`Failure` status.
///
/// When every child fails the selector reports `Success`, not `Failure`.
pub struct Selector {
    label: String,
    children: Children,
}

impl Selector {
    pub fn new(label: impl Into<String>, children: Children) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

impl BtNode for Selector {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        tick_while(&mut self.children, ctx, Status::Failure).unwrap_or(Status::Success)
    }

    fn reset(&mut self) {
        reset_all(&mut self.children);
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Repeat-while-successful: `Running` as long as every child succeeds.
pub struct UntilFalse {
    label: String,
    children: Children,
}

impl UntilFalse {
    pub fn new(label: impl Into<String>, children: Children) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

impl BtNode for UntilFalse {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        tick_while(&mut self.children, ctx, Status::Success).unwrap_or(Status::Running)
    }

    fn reset(&mut self) {
        reset_all(&mut self.children);
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Repeat-while-failing: `Running` as long as every child fails.
pub struct UntilTrue {
    label: String,
    children: Children,
}

impl UntilTrue {
    pub fn new(label: impl Into<String>, children: Children) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

impl BtNode for UntilTrue {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        tick_while(&mut self.children, ctx, Status::Failure).unwrap_or(Status::Running)
    }

    fn reset(&mut self) {
        reset_all(&mut self.children);
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Ticks every child once and decides by counting outcomes.
///
/// - any `Invalid` → `Invalid` (remaining children are not ticked)
/// - `successes >= threshold` → `Success`
/// - `failures > children - threshold` → `Failure`
/// - otherwise `Running`
///
/// Only the success threshold is configurable. Descriptions written with a second
/// `failureThreshold` param still load, but the failure bound is always derived from the
/// success threshold as above.
pub struct Parallel {
    label: String,
    children: Children,
    threshold: usize,
}

impl Parallel {
    /// `threshold` of `None` requires every child to succeed.
    pub fn new(label: impl Into<String>, threshold: Option<usize>, children: Children) -> Self {
        let threshold = threshold.unwrap_or(children.len());
        Self {
            label: label.into(),
            children,
            threshold,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

impl BtNode for Parallel {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        if self.children.is_empty() {
            return Status::Invalid;
        }

        let mut successes = 0usize;
        let mut failures = 0usize;
        for child in self.children.iter_mut() {
            match child.tick(ctx) {
                Status::Invalid => return Status::Invalid,
                Status::Success => successes += 1,
                Status::Failure => failures += 1,
                _ => {}
            }
        }

        let allowed_failures = self.children.len().saturating_sub(self.threshold);
        if successes >= self.threshold {
            Status::Success
        } else if failures > allowed_failures {
            Status::Failure
        } else {
            Status::Running
        }
    }

    fn reset(&mut self) {
        reset_all(&mut self.children);
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Ticks every child once; the first terminal result in child order wins.
pub struct FirstReturn {
    label: String,
    children: Children,
}

impl FirstReturn {
    pub fn new(label: impl Into<String>, children: Children) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

impl BtNode for FirstReturn {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        if self.children.is_empty() {
            return Status::Invalid;
        }

        let mut first = None;
        for child in self.children.iter_mut() {
            let status = child.tick(ctx);
            if status.is_invalid() {
                return Status::Invalid;
            }
            if first.is_none() && status.is_terminal() {
                first = Some(status);
            }
        }
        first.unwrap_or(Status::Running)
    }

    fn reset(&mut self) {
        reset_all(&mut self.children);
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Ticks every child once regardless of outcome.
///
/// `Running` while any child is still running, `Success` once none are.
pub struct AlwaysRun {
    label: String,
    children: Children,
}

impl AlwaysRun {
    pub fn new(label: impl Into<String>, children: Children) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

impl BtNode for AlwaysRun {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        if self.children.is_empty() {
            return Status::Invalid;
        }

        let mut running = false;
        for child in self.children.iter_mut() {
            match child.tick(ctx) {
                Status::Invalid => return Status::Invalid,
                Status::Running => running = true,
                _ => {}
            }
        }
        if running {
            Status::Running
        } else {
            Status::Success
        }
    }

    fn reset(&mut self) {
        reset_all(&mut self.children);
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// ReturnTrue / ReturnFalse: replaces a terminal child status with a fixed one.
pub struct ReturnStatus {
    label: String,
    child: Box<dyn BtNode>,
    fixed: Status,
}

impl ReturnStatus {
    pub fn always_success(label: impl Into<String>, child: Box<dyn BtNode>) -> Self {
        Self {
            label: label.into(),
            child,
            fixed: Status::Success,
        }
    }

    pub fn always_failure(label: impl Into<String>, child: Box<dyn BtNode>) -> Self {
        Self {
            label: label.into(),
            child,
            fixed: Status::Failure,
        }
    }
}

impl BtNode for ReturnStatus {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        self.child.tick(ctx).force(self.fixed)
    }

    fn reset(&mut self) {
        self.child.reset();
    }

    fn label(&self) -> &str {
        &self.label
    }
}

pub struct Negate {
    label: String,
    child: Box<dyn BtNode>,
}

impl Negate {
    pub fn new(label: impl Into<String>, child: Box<dyn BtNode>) -> Self {
        Self {
            label: label.into(),
            child,
        }
    }
}

impl BtNode for Negate {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        self.child.tick(ctx).negate()
    }

    fn reset(&mut self) {
        self.child.reset();
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Ticks the child up to `count` times within one tick.
///
/// Stops early on `Running` or `Invalid`; otherwise returns the last child status. A count of
/// zero never ticks the child and reports `Invalid`.
pub struct Repeat {
    label: String,
    child: Box<dyn BtNode>,
    count: usize,
}

impl Repeat {
    pub fn new(label: impl Into<String>, count: usize, child: Box<dyn BtNode>) -> Self {
        Self {
            label: label.into(),
            child,
            count,
        }
    }
}

impl BtNode for Repeat {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        let mut status = Status::Invalid;
        for _ in 0..self.count {
            status = self.child.tick(ctx);
            if matches!(status, Status::Running | Status::Invalid) {
                return status;
            }
        }
        status
    }

    fn reset(&mut self) {
        self.child.reset();
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Leaf backed by an injected callback.
pub struct Leaf {
    label: String,
    tick: LeafFn,
    params: Vec<String>,
}

impl Leaf {
    pub fn new(label: impl Into<String>, tick: LeafFn, params: Vec<String>) -> Self {
        Self {
            label: label.into(),
            tick,
            params,
        }
    }
}

impl BtNode for Leaf {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        (self.tick)(ctx, &self.params)
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Decorator backed by an injected callback that decides if and how to tick its child.
pub struct Decorator {
    label: String,
    filter: DecoratorFn,
    child: Box<dyn BtNode>,
    params: Vec<String>,
}

impl Decorator {
    pub fn new(
        label: impl Into<String>,
        filter: DecoratorFn,
        child: Box<dyn BtNode>,
        params: Vec<String>,
    ) -> Self {
        Self {
            label: label.into(),
            filter,
            child,
            params,
        }
    }
}

impl BtNode for Decorator {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Status {
        (self.filter)(ctx, self.child.as_mut(), &self.params)
    }

    fn reset(&mut self) {
        self.child.reset();
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Placeholder for a child that failed to build. Always `Invalid`.
pub struct Missing {
    label: String,
    reason: String,
}

impl Missing {
    pub fn new(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl BtNode for Missing {
    fn tick(&mut self, _ctx: &mut TickContext<'_>) -> Status {
        Status::Invalid
    }

    fn label(&self) -> &str {
        &self.label
    }
}
