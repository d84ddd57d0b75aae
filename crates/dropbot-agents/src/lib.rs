//! Bot behaviors for a drop-in survival match.
//!
//! Each bot gets its own behavior tree (see [`tree::build_bot_tree`]) and an [`AgentState`]
//! stored in its blackboard. [`BotManager`] owns every live bot, the spawn [`PoiPool`], and the
//! per-tick loop; the host implements [`BotWorldView`] and [`BotWorldMut`] over its simulation.
//! [`SandboxWorld`] is a small in-memory implementation used by tests and the `dropbot-sim`
//! harness.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod build;
pub mod combat;
pub mod config;
pub mod error;
pub mod focus;
pub mod hazard;
pub mod keys;
pub mod lifecycle;
pub mod loot;
pub mod manager;
pub mod poi;
pub mod sandbox;
pub mod state;
pub mod stuck;
pub mod tree;
pub mod upkeep;
pub mod wander;
pub mod world;

pub use config::BotConfig;
pub use error::{ConfigError, CreateAgentError, PoiError};
pub use manager::BotManager;
pub use poi::{PoiPlacement, PoiPool, PoiSpawnPoint};
pub use sandbox::{SandboxCommand, SandboxWorld};
pub use state::{AgentState, Phase, AGENT_STATE};
pub use world::{
    BotWorldMut, BotWorldView, BuildPiece, EntityCategory, EntityKind, InventoryItem, ItemId,
    ItemKind, MoveRequest, MoveStatus, SafeZone, Vitals, WorldEntity,
};
