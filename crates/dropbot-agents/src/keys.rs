//! Blackboard keys shared between the bot tree's decorators, tasks and services.

use dropbot_core::{BbKey, Vec3};

/// Current [`crate::Phase`] as an integer, for `EnumCompare` guards.
pub const PHASE: BbKey<i32> = BbKey::new("Global.Phase");
pub const IS_IN_TRANSPORT: BbKey<bool> = BbKey::new("Global.IsInTransport");
pub const HAS_JUMPED: BbKey<bool> = BbKey::new("Global.HasJumped");
pub const HAS_LANDED: BbKey<bool> = BbKey::new("Global.HasLanded");
/// Preferred landing point; set by the host or by POI selection before the jump.
pub const JUMP_DESTINATION: BbKey<Vec3> = BbKey::new("Global.JumpDestination");

pub const HAS_TARGET: BbKey<bool> = BbKey::new("Combat.HasTarget");
pub const TARGET_LOCATION: BbKey<Vec3> = BbKey::new("Combat.TargetLocation");
/// A hostile is inside the build threat radius.
pub const THREAT_NEARBY: BbKey<bool> = BbKey::new("Combat.ThreatNearby");
pub const NEEDS_RELOAD: BbKey<bool> = BbKey::new("Combat.NeedsReload");

/// A stuck recovery destination is being followed.
pub const IS_RECOVERING: BbKey<bool> = BbKey::new("Nav.IsRecovering");

pub const LOOT_LOCATION: BbKey<Vec3> = BbKey::new("Loot.TargetLocation");

/// RNG stream ids passed to `TickContext::rng_for_agent`.
pub mod streams {
    pub const SPAWN: u64 = 1;
    pub const JUMP: u64 = 2;
    pub const COURTESY: u64 = 3;
    pub const STUCK: u64 = 4;
    pub const WANDER: u64 = 5;
    pub const TREE: u64 = 6;
    pub const FOCUS: u64 = 7;
}
