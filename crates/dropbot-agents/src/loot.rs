use dropbot_bt::{NodeResult, Task};
use dropbot_core::{Blackboard, EntityId, TickContext, Vec3};
use dropbot_tools::{emit as trace_emit, TraceEvent};
use tracing::debug;

use crate::config::LootConfig;
use crate::keys;
use crate::state::AgentState;
use crate::world::{
    BotWorldMut, BotWorldView, EntityCategory, EntityKind, InventoryItem, ItemKind, Vitals,
    WorldEntity,
};

/// What the agent currently needs, as far as loot scoring cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LootNeeds {
    pub low_vitals: bool,
    pub needs_ranged_weapon: bool,
}

impl LootNeeds {
    pub fn assess(vitals: Vitals, inventory: &[InventoryItem], config: &LootConfig) -> Self {
        Self {
            low_vitals: vitals.health < config.low_health_threshold
                || vitals.shield < config.low_shield_threshold,
            needs_ranged_weapon: !inventory.iter().any(InventoryItem::is_usable_ranged),
        }
    }
}

/// Category bonus for one loot entity, before distance weighting. `None` for anything that
/// isn't loot.
pub fn base_score(kind: EntityKind, needs: LootNeeds, config: &LootConfig) -> Option<f32> {
    match kind {
        EntityKind::Pickup { item } => Some(match item {
            ItemKind::Healing if needs.low_vitals => config.healing_bonus,
            ItemKind::RangedWeapon if needs.needs_ranged_weapon => config.weapon_bonus,
            _ => config.baseline,
        }),
        EntityKind::Container { opened: false } => Some(config.container_bonus),
        _ => None,
    }
}

/// Base score weighted by inverse distance. Distances under one unit count as one.
pub fn score(
    entity: &WorldEntity,
    origin: Vec3,
    needs: LootNeeds,
    config: &LootConfig,
) -> Option<f32> {
    let base = base_score(entity.kind, needs, config)?;
    Some(base / entity.position.distance(origin).max(1.0))
}

/// Best loot candidate within the search radius. Ties keep the first seen.
pub fn best_loot<W: BotWorldView>(
    world: &W,
    agent: W::Agent,
    origin: Vec3,
    config: &LootConfig,
) -> Option<EntityId> {
    let vitals = world.vitals(agent)?;
    let needs = LootNeeds::assess(vitals, world.inventory(agent), config);

    let mut best: Option<(f32, EntityId)> = None;
    let candidates = world
        .entities(EntityCategory::Pickup)
        .into_iter()
        .chain(world.entities(EntityCategory::Container));
    for entity in candidates {
        if entity.position.distance(origin) > config.search_radius {
            continue;
        }
        let Some(s) = score(&entity, origin, needs, config) else {
            continue;
        };
        if best.map_or(true, |(b, _)| s > b) {
            best = Some((s, entity.id));
        }
    }
    best.map(|(_, id)| id)
}

/// Walks to the best pickup or unopened container and collects or opens it.
///
/// The chosen candidate survives preemption: a revisited loot task keeps heading for the same
/// entity until the next rescan, or until the entity stops resolving.
#[derive(Debug, Clone)]
pub struct Loot {
    config: LootConfig,
}

impl Loot {
    pub fn new(config: &LootConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn interact_radius(&self, kind: EntityKind) -> f32 {
        match kind {
            EntityKind::Container { .. } => self.config.open_radius,
            _ => self.config.collect_radius,
        }
    }
}

impl<W> Task<W> for Loot
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
        let Some(origin) = world.position(agent) else {
            return NodeResult::Failed;
        };
        let now = ctx.now_seconds;

        if now >= state.loot_rescan_at {
            state.loot_target = best_loot(&*world, agent, origin, &self.config);
            state.loot_rescan_at = now + self.config.scan_interval_seconds;
            trace_emit(
                blackboard,
                TraceEvent::new(ctx.tick, "bot.loot.scan")
                    .with_b(u64::from(state.loot_target.is_some())),
            );
        }
        let target = state.loot_target.and_then(|id| world.entity(id)).filter(|e| {
            matches!(
                e.kind,
                EntityKind::Pickup { .. } | EntityKind::Container { opened: false }
            )
        });
        let Some(target) = target else {
            state.loot_target = None;
            state.store(blackboard);
            blackboard.set(keys::LOOT_LOCATION, Vec3::ZERO);
            return NodeResult::Failed;
        };
        blackboard.set(keys::LOOT_LOCATION, target.position);

        let radius = self.interact_radius(target.kind);
        if target.position.distance(origin) > radius {
            let request = world.move_to(agent, target.position, radius * 0.5);
            if request.is_failed() {
                state.loot_target = None;
                state.store(blackboard);
                return NodeResult::Failed;
            }
            state.store(blackboard);
            return NodeResult::InProgress;
        }

        if now < state.interaction_ready_at {
            state.store(blackboard);
            return NodeResult::InProgress;
        }

        let done = match target.kind {
            EntityKind::Container { .. } => world.open_container(agent, target.id),
            _ => world.pickup(agent, target.id),
        };
        state.interaction_ready_at = now + self.config.interaction_cooldown_seconds;
        state.loot_target = None;
        // The scan that chose this target is stale now; look again on the next tick.
        state.loot_rescan_at = now;
        state.store(blackboard);
        blackboard.set(keys::LOOT_LOCATION, Vec3::ZERO);
        trace_emit(
            blackboard,
            TraceEvent::new(ctx.tick, "bot.loot.collect")
                .with_a(target.id.0)
                .with_b(u64::from(done)),
        );
        debug!(agent = ?agent, entity = target.id.0, done, "loot interaction");

        NodeResult::from_bool(done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pickup(item: ItemKind, x: f32) -> WorldEntity {
        WorldEntity {
            id: EntityId(x as u64),
            position: Vec3::new(x, 0.0, 0.0),
            kind: EntityKind::Pickup { item },
        }
    }

    #[test]
    fn healing_beats_weapon_when_both_are_needed() {
        let config = LootConfig::default();
        let needs = LootNeeds {
            low_vitals: true,
            needs_ranged_weapon: true,
        };
        let heal = score(&pickup(ItemKind::Healing, 400.0), Vec3::ZERO, needs, &config);
        let gun = score(&pickup(ItemKind::RangedWeapon, 400.0), Vec3::ZERO, needs, &config);
        let ammo = score(&pickup(ItemKind::Ammo, 400.0), Vec3::ZERO, needs, &config);
        assert!(heal > gun);
        assert!(gun > ammo);
    }

    #[test]
    fn needs_fall_back_to_baseline() {
        let config = LootConfig::default();
        let needs = LootNeeds {
            low_vitals: false,
            needs_ranged_weapon: false,
        };
        let kind = EntityKind::Pickup {
            item: ItemKind::Healing,
        };
        assert_eq!(base_score(kind, needs, &config), Some(config.baseline));
    }

    #[test]
    fn closer_baseline_item_outscores_farther_one() {
        let config = LootConfig::default();
        let needs = LootNeeds {
            low_vitals: false,
            needs_ranged_weapon: false,
        };
        let near = score(&pickup(ItemKind::Ammo, 100.0), Vec3::ZERO, needs, &config);
        let far = score(&pickup(ItemKind::Ammo, 1000.0), Vec3::ZERO, needs, &config);
        assert!(near > far);
    }

    #[test]
    fn opened_containers_and_players_are_not_loot() {
        let config = LootConfig::default();
        let needs = LootNeeds::assess(Vitals::new(100.0, 0.0), &[], &config);
        assert!(needs.needs_ranged_weapon);
        assert!(!needs.low_vitals);
        assert_eq!(
            base_score(EntityKind::Container { opened: true }, needs, &config),
            None
        );
        let player = EntityKind::Player {
            team: None,
            alive: true,
        };
        assert_eq!(base_score(player, needs, &config), None);
    }
}
