use dropbot_bt::{NodeResult, Task};
use dropbot_core::{Blackboard, TickContext, Vec3};
use dropbot_tools::{emit as trace_emit, TraceEvent};
use tracing::debug;

use crate::combat::hostiles_in_range;
use crate::config::BuildConfig;
use crate::state::AgentState;
use crate::world::{BotWorldMut, BuildPiece};

/// Throws up cover between the bot and the nearest threat.
///
/// Places at most `max_attempts` pieces, alternating wall and stair, then backs off for the
/// cooldown. The attempt counter lives in [`AgentState`], so a preempted build resumes its
/// count; losing the threat resets it.
#[derive(Debug, Clone)]
pub struct DefensiveBuild {
    config: BuildConfig,
}

impl DefensiveBuild {
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl<W> Task<W> for DefensiveBuild
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
        let now = ctx.now_seconds;
        if now < state.build_ready_at {
            return NodeResult::Failed;
        }
        let Some(origin) = world.position(agent) else {
            return NodeResult::Failed;
        };

        let threat = hostiles_in_range(&*world, agent, origin, self.config.threat_radius)
            .into_iter()
            .min_by(|a, b| {
                a.position
                    .distance(origin)
                    .total_cmp(&b.position.distance(origin))
            });
        let Some(threat) = threat else {
            state.build_attempts = 0;
            state.store(blackboard);
            return NodeResult::Failed;
        };

        if state.build_attempts >= self.config.max_attempts {
            state.build_attempts = 0;
            state.build_ready_at = now + self.config.cooldown_seconds;
            state.store(blackboard);
            debug!(agent = ?agent, until = state.build_ready_at, "build backing off");
            return NodeResult::Failed;
        }

        let facing = (threat.position - origin).horizontal().normalize_or_zero();
        let location = origin
            + facing * self.config.placement_distance
            + Vec3::UP * self.config.placement_height;
        let piece = if state.build_attempts % 2 == 0 {
            BuildPiece::Wall
        } else {
            BuildPiece::Stair
        };
        let placed = world.place_build(agent, piece, location, facing);

        state.build_attempts += 1;
        state.store(blackboard);
        trace_emit(
            blackboard,
            TraceEvent::new(ctx.tick, "bot.build.attempt")
                .with_a(u64::from(state.build_attempts))
                .with_b(u64::from(placed)),
        );
        debug!(
            agent = ?agent,
            attempt = state.build_attempts,
            ?piece,
            placed,
            "build attempt"
        );
        NodeResult::Succeeded
    }
}
