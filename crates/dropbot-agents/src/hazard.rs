use dropbot_bt::{NodeResult, Task};
use dropbot_core::{Blackboard, TickContext, Vec3};
use dropbot_tools::{emit as trace_emit, TraceEvent};

use crate::config::HazardConfig;
use crate::world::{BotWorldMut, SafeZone};

/// Point to run to from `position` when outside `zone`.
///
/// The point lies on the segment from `position` to the zone center, strictly inside it, at
/// `inner_fraction` of the radius from the center. `None` when already inside.
pub fn retreat_point(position: Vec3, zone: SafeZone, inner_fraction: f32) -> Option<Vec3> {
    if zone.contains(position) {
        return None;
    }
    let offset = (position - zone.center).horizontal();
    let distance = offset.length();
    // Keep clear of both ends even for a zero-radius zone.
    let from_center = (zone.radius * inner_fraction.clamp(0.0, 1.0))
        .max(distance * 0.05)
        .min(distance * 0.95);
    let point = zone.center + offset.normalize_or_zero() * from_center;
    Some(Vec3::new(point.x, point.y, position.z))
}

/// Heads back into the safe zone. Fails while the bot is inside.
#[derive(Debug, Clone)]
pub struct FleeHazard {
    config: HazardConfig,
}

impl FleeHazard {
    pub fn new(config: &HazardConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl<W> Task<W> for FleeHazard
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
        let (Some(zone), Some(position)) = (world.safe_zone(), world.position(agent)) else {
            return NodeResult::Failed;
        };
        let Some(target) = retreat_point(position, zone, self.config.inner_fraction) else {
            return NodeResult::Failed;
        };

        world.stop_fire(agent);
        let request = world.move_to(agent, target, self.config.acceptance_radius);
        if request.is_failed() {
            return NodeResult::Failed;
        }
        trace_emit(
            blackboard,
            TraceEvent::new(ctx.tick, "bot.hazard.flee")
                .with_a(position.distance_2d(zone.center) as u64),
        );
        NodeResult::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(radius: f32) -> SafeZone {
        SafeZone {
            center: Vec3::ZERO,
            radius,
        }
    }

    #[test]
    fn inside_the_zone_needs_no_retreat() {
        assert_eq!(retreat_point(Vec3::new(100.0, 0.0, 0.0), zone(500.0), 0.5), None);
    }

    #[test]
    fn retreat_point_is_between_bot_and_center() {
        let position = Vec3::new(3000.0, 4000.0, 250.0);
        let target = retreat_point(position, zone(1000.0), 0.5).expect("outside");
        let d_center = target.distance_2d(Vec3::ZERO);
        assert!((d_center - 500.0).abs() < 1e-2);
        assert!(target.distance_2d(position) < position.distance_2d(Vec3::ZERO));
        assert_eq!(target.z, 250.0);
    }

    #[test]
    fn collapsed_zone_still_gives_an_interior_point() {
        let position = Vec3::new(100.0, 0.0, 0.0);
        let target = retreat_point(position, zone(0.0), 0.5).expect("outside");
        assert!(target.x > 0.0 && target.x < 100.0);
        assert_eq!(target.y, 0.0);
    }
}
