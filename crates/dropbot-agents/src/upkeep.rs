use dropbot_bt::ServiceBody;
use dropbot_core::{Blackboard, TickContext};
use dropbot_tools::{emit as trace_emit, TraceEvent};
use tracing::debug;

use crate::config::UpkeepConfig;
use crate::keys;
use crate::state::AgentState;
use crate::world::{BotWorldMut, ItemKind};

/// Periodic self-care: equip a healing consumable when hurt, reload an empty ranged weapon.
/// Each action has its own cooldown deadline in [`AgentState`].
#[derive(Debug, Clone)]
pub struct Upkeep {
    config: UpkeepConfig,
}

impl Upkeep {
    pub fn new(config: &UpkeepConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl<W> ServiceBody<W> for Upkeep
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
        let Some(vitals) = world.vitals(agent) else {
            return;
        };
        let now = ctx.now_seconds;

        if vitals.health < self.config.consumable_health_threshold
            && now >= state.consumable_ready_at
        {
            let healing = world
                .inventory(agent)
                .iter()
                .find(|item| item.kind == ItemKind::Healing && item.count > 0)
                .map(|item| item.id);
            if let Some(item) = healing {
                world.equip(agent, item);
                state.consumable_ready_at = now + self.config.consumable_cooldown_seconds;
                trace_emit(
                    blackboard,
                    TraceEvent::new(ctx.tick, "bot.upkeep.consumable").with_a(item.0),
                );
                debug!(agent = ?agent, health = vitals.health, "using consumable");
            }
        }

        let empty_weapon = world
            .equipped_item(agent)
            .is_some_and(|item| item.kind == ItemKind::RangedWeapon && item.ammo == 0);
        blackboard.set(keys::NEEDS_RELOAD, empty_weapon);
        if empty_weapon && now >= state.reload_ready_at {
            world.reload(agent);
            state.reload_ready_at = now + self.config.reload_cooldown_seconds;
            trace_emit(blackboard, TraceEvent::new(ctx.tick, "bot.upkeep.reload"));
            debug!(agent = ?agent, "reloading");
        }

        state.store(blackboard);
    }
}
