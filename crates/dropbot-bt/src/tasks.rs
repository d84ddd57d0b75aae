use dropbot_core::{Blackboard, TickContext, WorldMut};

use crate::bt::{NodeResult, Task};

/// Timed wait.
///
/// The deadline is armed on the first tick and kept as an absolute time, so a wait that was
/// preempted and revisited later completes as soon as the deadline has passed. It re-arms after
/// completing. A zero-length wait fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Wait {
    duration_seconds: f64,
    deadline: Option<f64>,
}

impl Wait {
    pub fn new(duration_seconds: f64) -> Self {
        Self {
            duration_seconds: duration_seconds.max(0.0),
            deadline: None,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration_seconds
    }

    /// Absolute expiry of the current wait, if one is armed.
    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }
}

impl<W> Task<W> for Wait
where
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _blackboard: &mut Blackboard,
    ) -> NodeResult {
        if self.duration_seconds <= 0.0 {
            return NodeResult::Failed;
        }
        let now = ctx.now_seconds;
        let deadline = *self.deadline.get_or_insert(now + self.duration_seconds);
        if now >= deadline {
            self.deadline = None;
            NodeResult::Succeeded
        } else {
            NodeResult::InProgress
        }
    }
}
