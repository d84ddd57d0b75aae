use dropbot_bt::{NodeResult, Task};
use dropbot_core::{Blackboard, DeterministicRng, TickContext, Vec3};

use crate::config::WanderConfig;
use crate::keys::streams;
use crate::world::BotWorldMut;

/// Lowest-priority fallback: keep moving toward a random nearby point, picking a new one
/// every change interval. Never finishes on its own.
#[derive(Debug, Clone)]
pub struct Wander {
    config: WanderConfig,
    next_change_at: f64,
    destination: Option<Vec3>,
}

impl Wander {
    pub fn new(config: &WanderConfig) -> Self {
        Self {
            config: config.clone(),
            next_change_at: 0.0,
            destination: None,
        }
    }
}

impl<W> Task<W> for Wander
where
    W: BotWorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        _blackboard: &mut Blackboard,
    ) -> NodeResult {
        let Some(position) = world.position(agent) else {
            return NodeResult::Failed;
        };
        let now = ctx.now_seconds;

        if self.destination.is_none() || now >= self.next_change_at {
            let mut rng = ctx.rng_for_agent(agent, streams::WANDER);
            let r = self.config.offset;
            let offset = Vec3::new(rng.range_f32(-r, r), rng.range_f32(-r, r), 0.0);
            self.destination = Some(position + offset);
            self.next_change_at = now + self.config.change_interval_seconds;
        }

        match self.destination {
            Some(destination) => {
                let request = world.move_to(agent, destination, self.config.acceptance_radius);
                if request.is_failed() {
                    self.destination = None;
                    return NodeResult::Failed;
                }
                NodeResult::InProgress
            }
            None => NodeResult::Failed,
        }
    }
}
