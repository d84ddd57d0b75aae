use crate::AgentId;

/// Read-only access to the host simulation.
///
/// Only the agent id type is fixed here. Behavior crates define extension traits for the
/// queries they need (positions, inventories, entity scans, ...).
pub trait WorldView {
    type Agent: AgentId;
}

/// Command sink into the host simulation.
pub trait WorldMut: WorldView {}

/// Identifier of a non-agent world entity (players, pickups, containers).
///
/// Behaviors only ever hold these as weak references and resolve them through the world on
/// each use; the entity may be gone by the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u64);
