use dropbot_bt::ServiceBody;
use dropbot_core::{Blackboard, DeterministicRng, TickContext, Vec3};

use crate::config::FocusConfig;
use crate::keys::{self, streams};
use crate::world::BotWorldMut;

/// Idle look-around: while there is no combat target, point the bot's focus at a random spot
/// just around it. Engage owns the focal point once a target is locked.
#[derive(Debug, Clone)]
pub struct LookAround {
    config: FocusConfig,
}

impl LookAround {
    pub fn new(config: &FocusConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl<W> ServiceBody<W> for LookAround
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
        if blackboard.is_set(keys::HAS_TARGET) {
            return;
        }
        let Some(position) = world.position(agent) else {
            return;
        };
        let mut rng = ctx.rng_for_agent(agent, streams::FOCUS);
        let r = self.config.offset;
        let offset = Vec3::new(
            rng.range_f32(-r, r),
            rng.range_f32(-r, r),
            rng.range_f32(-r * 0.5, r * 0.5),
        );
        world.set_focal_point(agent, Some(position + offset));
    }
}
