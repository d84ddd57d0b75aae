use core::fmt::{self, Debug};

/// Identifier the host uses for a bot.
///
/// Agents are ticked in `Ord` order and seeded from `stable_id`, so both must be stable for
/// the lifetime of a match.
pub trait AgentId: Copy + Ord + Eq + Debug {
    fn stable_id(self) -> u64;
}

impl AgentId for u64 {
    fn stable_id(self) -> u64 {
        self
    }
}

impl AgentId for u32 {
    fn stable_id(self) -> u64 {
        u64::from(self)
    }
}

/// Dense bot handle for hosts that don't have their own id type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BotId(pub u32);

impl AgentId for BotId {
    fn stable_id(self) -> u64 {
        u64::from(self.0)
    }
}

impl From<u32> for BotId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bot-{}", self.0)
    }
}
