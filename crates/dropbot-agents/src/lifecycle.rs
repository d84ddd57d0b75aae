//! Boarding, jump, descent and landing.

use dropbot_bt::{NodeResult, ServiceBody, Task};
use dropbot_core::rng::{derive_seed, rate_to_probability};
use dropbot_core::{AgentId, Blackboard, DeterministicRng, SplitMix64, TickContext, Vec3};
use dropbot_tools::{emit as trace_emit, TraceEvent};
use tracing::info;

use crate::config::{CourtesyMode, LifecycleConfig};
use crate::keys::{self, streams};
use crate::state::{AgentState, Phase};
use crate::world::{BotWorldMut, Vitals};

/// Fresh state for a bot spawned at `now_seconds`, with its jump delay and courtesy deadline
/// drawn from a stream private to that bot.
pub fn spawn_state<A: AgentId>(
    config: &LifecycleConfig,
    seed: u64,
    agent: A,
    now_seconds: f64,
) -> AgentState {
    let mut rng = SplitMix64::new(derive_seed(seed, agent.stable_id(), 0, streams::SPAWN));
    let mut state = AgentState::new(now_seconds);
    state.jump_ready_at = now_seconds
        + rng.range_f64(config.jump_delay_min_seconds, config.jump_delay_max_seconds);
    if config.courtesy_mode == CourtesyMode::Deadline {
        state.courtesy_at = Some(
            now_seconds
                + rng.range_f64(
                    config.courtesy_delay_min_seconds,
                    config.courtesy_delay_max_seconds,
                ),
        );
    }
    if !config.spawn_in_transport {
        state.phase = Phase::Landed;
    }
    state
}

/// Leaves the transport once it is unlocked and the bot's jump delay has passed.
///
/// Fails while either gate is closed. The jump itself is one-shot: the bot goes through
/// `Jumping` and ends the tick in `Falling`.
#[derive(Debug, Clone)]
pub struct JumpFromTransport {
    spawn_vitals: Vitals,
}

impl JumpFromTransport {
    pub fn new(config: &LifecycleConfig) -> Self {
        Self {
            spawn_vitals: Vitals::new(config.spawn_health, config.spawn_shield),
        }
    }
}

impl<W> Task<W> for JumpFromTransport
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
        if state.phase != Phase::Boarding
            || !world.transport_unlocked()
            || ctx.now_seconds < state.jump_ready_at
        {
            return NodeResult::Failed;
        }
        let Some(exit) = world.transport_location() else {
            return NodeResult::Failed;
        };

        state.enter_phase(Phase::Jumping, blackboard);
        state.jumps += 1;
        trace_emit(
            blackboard,
            TraceEvent::new(ctx.tick, "bot.phase.jumping").with_a(u64::from(state.jumps)),
        );

        world.teleport(agent, exit);
        world.begin_descent(agent);
        world.set_vitals(agent, self.spawn_vitals);

        let destination = descent_destination(ctx, agent, world, blackboard, exit);
        state.descent_target = Some(destination);
        state.enter_phase(Phase::Falling, blackboard);
        state.store(blackboard);
        trace_emit(blackboard, TraceEvent::new(ctx.tick, "bot.phase.falling"));
        info!(
            agent = ?agent,
            at = ctx.now_seconds,
            dest_x = destination.x,
            dest_y = destination.y,
            "jumped from transport"
        );
        NodeResult::Succeeded
    }
}

/// Blackboard destination, else a random spawn anchor, else where the bot is.
fn descent_destination<W: BotWorldMut>(
    ctx: &TickContext,
    agent: W::Agent,
    world: &W,
    blackboard: &Blackboard,
    exit: Vec3,
) -> Vec3 {
    if blackboard.is_set(keys::JUMP_DESTINATION) {
        return blackboard.value_or_default(keys::JUMP_DESTINATION);
    }
    let anchors = world.spawn_anchors();
    if !anchors.is_empty() {
        let mut rng = ctx.rng_for_agent(agent, streams::JUMP);
        let pick = rng.below(anchors.len() as u64) as usize;
        return anchors[pick];
    }
    world.position(agent).unwrap_or(exit)
}

/// The one-time "thank the driver" gesture while boarding.
#[derive(Debug, Clone)]
pub struct Courtesy {
    mode: CourtesyMode,
    rate_per_second: f64,
    last_roll: Option<f64>,
}

impl Courtesy {
    pub fn new(config: &LifecycleConfig) -> Self {
        Self {
            mode: config.courtesy_mode,
            rate_per_second: config.courtesy_rate_per_second,
            last_roll: None,
        }
    }

    fn due<A: AgentId>(&mut self, ctx: &TickContext, agent: A, state: &AgentState) -> bool {
        match self.mode {
            CourtesyMode::Deadline => state.courtesy_at.is_some_and(|at| ctx.now_seconds >= at),
            CourtesyMode::Rate => {
                let elapsed = match self.last_roll {
                    Some(last) => ctx.now_seconds - last,
                    None => f64::from(ctx.dt_seconds),
                };
                self.last_roll = Some(ctx.now_seconds);
                let mut rng = ctx.rng_for_agent(agent, streams::COURTESY);
                rng.chance(rate_to_probability(self.rate_per_second, elapsed))
            }
        }
    }
}

impl<W> ServiceBody<W> for Courtesy
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
        if state.thanked || state.phase != Phase::Boarding {
            return;
        }
        if !self.due(ctx, agent, &state) {
            return;
        }

        world.thank_driver(agent);
        state.thanked = true;
        state.store(blackboard);
        trace_emit(blackboard, TraceEvent::new(ctx.tick, "bot.courtesy"));
        info!(agent = ?agent, at = ctx.now_seconds, "thanked the driver");
    }
}

/// Steers the descent and detects touchdown.
///
/// While airborne each tick aims one dive step below the bot, above its descent target. The
/// landing is one-shot: the first tick the bot is no longer airborne moves it to `Landed`.
#[derive(Debug, Clone)]
pub struct Descend {
    dive_step: f32,
    acceptance_radius: f32,
}

impl Descend {
    pub fn new(config: &LifecycleConfig) -> Self {
        Self {
            dive_step: config.dive_step,
            acceptance_radius: config.descent_acceptance_radius,
        }
    }
}

impl<W> Task<W> for Descend
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
        if state.phase != Phase::Falling {
            return NodeResult::Failed;
        }

        if !world.is_airborne(agent) {
            state.enter_phase(Phase::Landed, blackboard);
            state.store(blackboard);
            trace_emit(blackboard, TraceEvent::new(ctx.tick, "bot.phase.landed"));
            info!(agent = ?agent, at = ctx.now_seconds, "landed");
            return NodeResult::Succeeded;
        }

        let Some(position) = world.position(agent) else {
            return NodeResult::Failed;
        };
        if let Some(target) = state.descent_target {
            let aim = Vec3::new(target.x, target.y, position.z - self.dive_step);
            world.move_to(agent, aim, self.acceptance_radius);
        }
        NodeResult::InProgress
    }
}
