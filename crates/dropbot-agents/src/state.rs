use dropbot_core::{BbKey, Blackboard, EntityId, Vec3};

use crate::keys;

/// Lifecycle phase of one bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(i32)]
pub enum Phase {
    #[default]
    Boarding = 0,
    Jumping = 1,
    Falling = 2,
    Landed = 3,
}

impl From<Phase> for i32 {
    fn from(phase: Phase) -> Self {
        phase as i32
    }
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Boarding => "boarding",
            Phase::Jumping => "jumping",
            Phase::Falling => "falling",
            Phase::Landed => "landed",
        }
    }
}

/// Position sampling for stuck detection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StuckTracker {
    pub last_sample: Option<Vec3>,
    pub last_sample_time: f64,
    /// Consecutive stalled samples.
    pub consecutive: u32,
    /// Recoveries triggered so far.
    pub recoveries: u32,
    /// Destination of the active recovery, followed until reached or `recovery_until`.
    pub recovery_target: Option<Vec3>,
    pub recovery_until: f64,
}

/// Persistent per-bot fields, stored in the bot's blackboard under [`AGENT_STATE`].
///
/// All times are absolute simulation seconds. Entity references are weak: they are resolved
/// through the world on every use and dropped once they no longer resolve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AgentState {
    pub phase: Phase,
    pub spawn_time: f64,
    /// Earliest time the bot may leave the transport.
    pub jump_ready_at: f64,
    pub jumps: u32,
    /// Courtesy deadline when running in deadline mode.
    pub courtesy_at: Option<f64>,
    pub thanked: bool,
    pub descent_target: Option<Vec3>,

    pub stuck: StuckTracker,

    pub target: Option<EntityId>,
    pub target_locked_until: f64,

    pub reload_ready_at: f64,
    pub consumable_ready_at: f64,
    pub interaction_ready_at: f64,

    pub loot_target: Option<EntityId>,
    pub loot_rescan_at: f64,

    pub build_attempts: u32,
    pub build_ready_at: f64,
}

pub const AGENT_STATE: BbKey<AgentState> = BbKey::new("Bot.State");

impl AgentState {
    pub fn new(spawn_time: f64) -> Self {
        Self {
            spawn_time,
            ..Self::default()
        }
    }

    /// Copy of the state stored in `blackboard`, if the bot has one.
    pub fn load(blackboard: &Blackboard) -> Option<Self> {
        blackboard.get(AGENT_STATE).copied()
    }

    pub fn store(self, blackboard: &mut Blackboard) {
        blackboard.set(AGENT_STATE, self);
    }

    /// Change phase and mirror it into the blackboard flags the tree's guards read.
    pub fn enter_phase(&mut self, phase: Phase, blackboard: &mut Blackboard) {
        self.phase = phase;
        blackboard.set(keys::PHASE, i32::from(phase));
        blackboard.set(keys::IS_IN_TRANSPORT, phase == Phase::Boarding);
        if phase >= Phase::Jumping {
            blackboard.set(keys::HAS_JUMPED, true);
        }
        if phase == Phase::Landed {
            blackboard.set(keys::HAS_LANDED, true);
        }
    }

    /// Forget the combat target.
    pub fn clear_target(&mut self, blackboard: &mut Blackboard) {
        self.target = None;
        blackboard.set(keys::HAS_TARGET, false);
        blackboard.set(keys::TARGET_LOCATION, Vec3::ZERO);
    }
}
