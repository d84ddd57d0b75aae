use dropbot_core::{Blackboard, TickContext, WorldMut};

/// Outcome of ticking a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeResult {
    Succeeded,
    Failed,
    InProgress,
}

impl NodeResult {
    pub fn is_failed(self) -> bool {
        self == NodeResult::Failed
    }

    /// `Succeeded` for `true`, `Failed` for `false`.
    pub fn from_bool(ok: bool) -> Self {
        if ok {
            NodeResult::Succeeded
        } else {
            NodeResult::Failed
        }
    }
}

/// Leaf behavior.
///
/// Ticking a task that returned `InProgress` continues the same logical operation. A task can
/// be skipped for any number of ticks when a higher-priority sibling takes over, so state that
/// spans ticks should be absolute deadlines against `TickContext::now_seconds`, not counters.
pub trait Task<W>: 'static
where
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> NodeResult;
}

/// Task backed by a closure.
pub struct TaskFn<F> {
    f: F,
}

impl<F> TaskFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, W> Task<W> for TaskFn<F>
where
    F: FnMut(&TickContext, W::Agent, &mut W, &mut Blackboard) -> NodeResult + 'static,
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> NodeResult {
        (self.f)(ctx, agent, world, blackboard)
    }
}
