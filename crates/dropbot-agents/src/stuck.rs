use dropbot_bt::{NodeResult, ServiceBody, Task};
use dropbot_core::{Blackboard, DeterministicRng, TickContext, Vec3};
use dropbot_tools::{emit as trace_emit, TraceEvent};
use tracing::info;

use crate::config::StuckConfig;
use crate::keys::{self, streams};
use crate::state::{AgentState, StuckTracker};
use crate::world::{BotWorldMut, MoveRequest};

/// Outcome of one stuck-detection sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StuckVerdict {
    /// Not moving, moved enough, or first sample.
    Progressing,
    /// Stalled; carries the consecutive stall count.
    Stalled(u32),
    /// Reached the trigger count. The counter has been reset.
    Stuck,
}

impl StuckTracker {
    /// Record a position sample.
    ///
    /// A sample counts as stalled when a move command is active and the bot covered less than
    /// `min_displacement` since the previous sample. Anything else resets the run, including a
    /// gap of more than two check intervals since the previous sample.
    pub fn sample(
        &mut self,
        now_seconds: f64,
        position: Vec3,
        moving: bool,
        config: &StuckConfig,
    ) -> StuckVerdict {
        let previous = self.last_sample.replace(position);
        let gap = now_seconds - std::mem::replace(&mut self.last_sample_time, now_seconds);

        let stalled = match previous {
            Some(_) if gap > 2.0 * config.check_interval_seconds => false,
            Some(prev) => moving && prev.distance(position) < config.min_displacement,
            None => false,
        };
        if !stalled {
            self.consecutive = 0;
            return StuckVerdict::Progressing;
        }

        self.consecutive += 1;
        if self.consecutive >= config.trigger_count {
            self.consecutive = 0;
            self.recoveries += 1;
            return StuckVerdict::Stuck;
        }
        StuckVerdict::Stalled(self.consecutive)
    }
}

/// Samples the bot's position each interval and runs the recovery maneuver when it is stuck:
/// cancel the move, jump, and head for a random nearby point. [`RecoverFromStuck`] keeps the bot
/// on that point afterwards.
#[derive(Debug, Clone)]
pub struct StuckCheck {
    config: StuckConfig,
}

impl StuckCheck {
    pub fn new(config: &StuckConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl<W> ServiceBody<W> for StuckCheck
where
    W: BotWorldMut + 'static,
{
    fn fire(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) {
        let Some(mut state) = AgentState::load(blackboard) else {
            return;
        };
        let Some(position) = world.position(agent) else {
            return;
        };
        let moving = world.move_status(agent).is_moving();

        let verdict = state
            .stuck
            .sample(ctx.now_seconds, position, moving, &self.config);
        state.store(blackboard);

        match verdict {
            StuckVerdict::Progressing => {}
            StuckVerdict::Stalled(count) => {
                trace_emit(
                    blackboard,
                    TraceEvent::new(ctx.tick, "bot.stuck.stalled").with_a(u64::from(count)),
                );
            }
            StuckVerdict::Stuck => {
                let mut rng = ctx.rng_for_agent(agent, streams::STUCK);
                let r = self.config.recovery_radius;
                let destination = position
                    + Vec3::new(rng.range_f32(-r, r), rng.range_f32(-r, r), 0.0);

                world.stop_movement(agent);
                world.jump(agent);
                world.move_to(agent, destination, self.config.recovery_acceptance_radius);

                state.stuck.recovery_target = Some(destination);
                state.stuck.recovery_until = ctx.now_seconds + self.config.recovery_timeout_seconds;
                state.store(blackboard);
                blackboard.set(keys::IS_RECOVERING, true);

                trace_emit(
                    blackboard,
                    TraceEvent::new(ctx.tick, "bot.stuck.recover")
                        .with_a(u64::from(state.stuck.recoveries)),
                );
                info!(
                    agent = ?agent,
                    attempt = state.stuck.recoveries,
                    "stuck, attempting recovery"
                );
            }
        }
    }
}

/// Follows the destination picked by the last stuck recovery until the bot reaches it or the
/// recovery times out. Fails when no recovery is active.
#[derive(Debug, Clone)]
pub struct RecoverFromStuck {
    config: StuckConfig,
}

impl RecoverFromStuck {
    pub fn new(config: &StuckConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

fn end_recovery(state: &mut AgentState, blackboard: &mut Blackboard) {
    state.stuck.recovery_target = None;
    state.store(blackboard);
    blackboard.set(keys::IS_RECOVERING, false);
}

impl<W> Task<W> for RecoverFromStuck
where
    W: BotWorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> NodeResult {
        let Some(mut state) = AgentState::load(blackboard) else {
            return NodeResult::Failed;
        };
        let Some(target) = state.stuck.recovery_target else {
            blackboard.set(keys::IS_RECOVERING, false);
            return NodeResult::Failed;
        };
        if ctx.now_seconds >= state.stuck.recovery_until {
            end_recovery(&mut state, blackboard);
            return NodeResult::Failed;
        }

        let radius = self.config.recovery_acceptance_radius;
        let request = world.move_to(agent, target, radius);
        if request != MoveRequest::Accepted {
            end_recovery(&mut state, blackboard);
            return NodeResult::Failed;
        }
        NodeResult::InProgress
    }
}
