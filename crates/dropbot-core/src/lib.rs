//! Deterministic, engine-agnostic kernel primitives for bot decision making.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod blackboard;
pub mod math;
pub mod rng;
pub mod tick;
pub mod world;

pub use agent::{AgentId, BotId};
pub use blackboard::{BbKey, Blackboard};
pub use math::Vec3;
pub use rng::{DeterministicRng, SplitMix64};
pub use tick::TickContext;
pub use world::{EntityId, WorldMut, WorldView};
