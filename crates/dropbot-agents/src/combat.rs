use dropbot_bt::{NodeResult, ServiceBody, Task};
use dropbot_core::{Blackboard, EntityId, TickContext, Vec3};
use dropbot_tools::{emit as trace_emit, TraceEvent};
use tracing::debug;

use crate::config::{BuildConfig, CombatConfig};
use crate::keys;
use crate::state::AgentState;
use crate::world::{BotWorldMut, BotWorldView, EntityCategory, ItemKind, WorldEntity};

/// Live hostiles within `max_range` of the agent, excluding the agent itself.
pub fn hostiles_in_range<W: BotWorldView>(
    world: &W,
    agent: W::Agent,
    origin: Vec3,
    max_range: f32,
) -> Vec<WorldEntity> {
    let own = world.entity_id(agent);
    let team = world.team(agent);
    world
        .entities(EntityCategory::Player)
        .into_iter()
        .filter(|e| Some(e.id) != own)
        .filter(|e| e.is_hostile_to(team))
        .filter(|e| e.position.distance(origin) <= max_range)
        .collect()
}

/// Highest `max_range - distance` score, i.e. the closest candidate. Ties keep the first seen.
pub fn best_candidate(
    origin: Vec3,
    max_range: f32,
    candidates: &[WorldEntity],
) -> Option<EntityId> {
    let mut best: Option<(f32, EntityId)> = None;
    for candidate in candidates {
        let score = max_range - candidate.position.distance(origin);
        if best.map_or(true, |(s, _)| score > s) {
            best = Some((score, candidate.id));
        }
    }
    best.map(|(_, id)| id)
}

/// Periodic hostile scan that maintains the locked combat target.
///
/// A locked target is kept until its switch cooldown runs out, even if something closer shows
/// up, unless it dies or leaves range. The scan also raises [`keys::THREAT_NEARBY`] for the
/// build branch.
#[derive(Debug, Clone)]
pub struct TargetAcquisition {
    config: CombatConfig,
    threat_radius: f32,
}

impl TargetAcquisition {
    pub fn new(config: &CombatConfig, build: &BuildConfig) -> Self {
        Self {
            config: config.clone(),
            threat_radius: build.threat_radius,
        }
    }
}

impl<W> ServiceBody<W> for TargetAcquisition
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
        let Some(origin) = world.position(agent) else {
            return;
        };
        let now = ctx.now_seconds;
        let range = self.config.max_range;

        let candidates = hostiles_in_range(&*world, agent, origin, range);
        let threat = candidates
            .iter()
            .any(|e| e.position.distance(origin) <= self.threat_radius);
        blackboard.set(keys::THREAT_NEARBY, threat);

        let locked = state
            .target
            .and_then(|id| candidates.iter().find(|e| e.id == id))
            .copied();
        if let Some(current) = locked {
            if now < state.target_locked_until {
                blackboard.set(keys::HAS_TARGET, true);
                blackboard.set(keys::TARGET_LOCATION, current.position);
                state.store(blackboard);
                return;
            }
        }

        match best_candidate(origin, range, &candidates) {
            Some(best) => {
                if state.target != Some(best) {
                    debug!(
                        agent = ?agent,
                        from = ?state.target,
                        to = ?best,
                        "combat target switch"
                    );
                    trace_emit(
                        blackboard,
                        TraceEvent::new(ctx.tick, "bot.target.switch").with_a(best.0),
                    );
                    state.target = Some(best);
                    state.target_locked_until = now + self.config.switch_cooldown_seconds;
                }
                let location = candidates
                    .iter()
                    .find(|e| e.id == best)
                    .map_or(Vec3::ZERO, |e| e.position);
                blackboard.set(keys::HAS_TARGET, true);
                blackboard.set(keys::TARGET_LOCATION, location);
            }
            None => state.clear_target(blackboard),
        }
        state.store(blackboard);
    }
}

/// Fights the locked target: closes distance when out of firing range, otherwise makes sure
/// a ranged weapon is in hand, aims and fires.
#[derive(Debug, Clone)]
pub struct Engage {
    config: CombatConfig,
}

impl Engage {
    pub fn new(config: &CombatConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl<W> Task<W> for Engage
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
        let team = world.team(agent);
        let target = state
            .target
            .and_then(|id| world.entity(id))
            .filter(|e| e.is_hostile_to(team))
            .filter(|e| e.position.distance(origin) <= self.config.max_range);
        let Some(target) = target else {
            state.clear_target(blackboard);
            state.store(blackboard);
            world.stop_fire(agent);
            world.set_focal_point(agent, None);
            return NodeResult::Failed;
        };
        blackboard.set(keys::TARGET_LOCATION, target.position);

        if target.position.distance(origin) > self.config.fire_range {
            world.stop_fire(agent);
            let request = world.move_to(agent, target.position, self.config.approach_radius);
            return if request.is_failed() {
                NodeResult::Failed
            } else {
                NodeResult::InProgress
            };
        }

        // Only a melee or empty hand is swapped; a consumable in hand is left for upkeep.
        let melee_only = world
            .equipped_item(agent)
            .map_or(true, |item| item.kind == ItemKind::MeleeWeapon);
        if melee_only {
            let ranged = world
                .inventory(agent)
                .iter()
                .filter(|item| item.is_usable_ranged())
                .max_by_key(|item| item.ammo)
                .map(|item| item.id);
            if let Some(item) = ranged {
                world.equip(agent, item);
                debug!(agent = ?agent, item = item.0, "switched to ranged weapon");
            }
        }

        world.stop_movement(agent);
        world.set_focal_point(agent, Some(target.position));
        world.start_fire(agent);
        trace_emit(
            blackboard,
            TraceEvent::new(ctx.tick, "bot.combat.fire").with_a(target.id.0),
        );
        NodeResult::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::EntityKind;

    fn player(id: u64, x: f32) -> WorldEntity {
        WorldEntity {
            id: EntityId(id),
            position: Vec3::new(x, 0.0, 0.0),
            kind: EntityKind::Player {
                team: Some(2),
                alive: true,
            },
        }
    }

    #[test]
    fn closest_candidate_scores_highest() {
        let candidates = [player(1, 900.0), player(2, 300.0), player(3, 4000.0)];
        assert_eq!(
            best_candidate(Vec3::ZERO, 5000.0, &candidates),
            Some(EntityId(2))
        );
        assert_eq!(best_candidate(Vec3::ZERO, 5000.0, &[]), None);
    }
}
