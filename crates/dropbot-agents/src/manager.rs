use std::collections::BTreeMap;

use dropbot_bt::{NodeResult, Tree};
use dropbot_core::rng::derive_seed;
use dropbot_core::{AgentId, Blackboard, SplitMix64, TickContext};
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::error::CreateAgentError;
use crate::keys::{self, streams};
use crate::lifecycle::spawn_state;
use crate::poi::{PoiPlacement, PoiPool};
use crate::state::{AgentState, Phase, AGENT_STATE};
use crate::tree::build_bot_tree;
use crate::world::BotWorldMut;

struct BotSlot<W>
where
    W: BotWorldMut + 'static,
{
    tree: Tree<W>,
    blackboard: Blackboard,
    poi: Option<String>,
}

/// Owns every live bot and drives their trees.
///
/// Bots are kept in a `BTreeMap`, so a tick visits them in id order and a run replays
/// identically for the same seed and world.
pub struct BotManager<W>
where
    W: BotWorldMut + 'static,
{
    config: BotConfig,
    agents: BTreeMap<W::Agent, BotSlot<W>>,
    pois: PoiPool,
    rng: SplitMix64,
}

impl<W> BotManager<W>
where
    W: BotWorldMut + 'static,
{
    pub fn new(config: BotConfig, pois: PoiPool) -> Self {
        let rng = SplitMix64::new(config.seed);
        Self {
            config,
            agents: BTreeMap::new(),
            pois,
            rng,
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Register a bot spawned at `now_seconds` and build its tree.
    pub fn create_agent(
        &mut self,
        agent: W::Agent,
        now_seconds: f64,
    ) -> Result<(), CreateAgentError> {
        if self.agents.contains_key(&agent) {
            warn!(agent = ?agent, "agent already registered");
            return Err(CreateAgentError::AlreadyExists(format!("{agent:?}")));
        }
        if self.agents.len() >= self.config.max_agents {
            warn!(agent = ?agent, max = self.config.max_agents, "population full");
            return Err(CreateAgentError::PopulationFull {
                max: self.config.max_agents,
            });
        }

        let mut tree_rng = SplitMix64::new(derive_seed(
            self.config.seed,
            agent.stable_id(),
            0,
            streams::TREE,
        ));
        let tree = build_bot_tree(&self.config, &mut tree_rng);

        let mut blackboard = Blackboard::new();
        let mut state = spawn_state(&self.config.lifecycle, self.config.seed, agent, now_seconds);
        let phase = state.phase;
        state.enter_phase(phase, &mut blackboard);
        state.store(&mut blackboard);

        self.agents.insert(
            agent,
            BotSlot {
                tree,
                blackboard,
                poi: None,
            },
        );
        info!(
            agent = ?agent,
            phase = phase.as_str(),
            jump_at = state.jump_ready_at,
            "agent created"
        );
        Ok(())
    }

    /// Remove a bot, returning its final state. A bot that never landed gives its POI slot
    /// back.
    pub fn destroy_agent(&mut self, agent: W::Agent) -> Option<AgentState> {
        let slot = self.agents.remove(&agent)?;
        let state = AgentState::load(&slot.blackboard);
        if let Some(poi) = &slot.poi {
            let landed = state.is_some_and(|s| s.phase == Phase::Landed);
            if !landed {
                self.pois.release(poi);
            }
        }
        info!(agent = ?agent, "agent destroyed");
        state
    }

    /// Pick a spawn placement from the POI pool.
    ///
    /// When `agent` is registered, the placement becomes its jump destination and the POI slot
    /// is remembered so [`BotManager::destroy_agent`] can release it.
    pub fn spawn_location(&mut self, agent: Option<W::Agent>) -> Option<PoiPlacement> {
        let placement = self.pois.select(&mut self.rng)?;
        if let Some(slot) = agent.and_then(|a| self.agents.get_mut(&a)) {
            if let Some(previous) = slot.poi.replace(placement.poi.clone()) {
                self.pois.release(&previous);
            }
            slot.blackboard.set(keys::JUMP_DESTINATION, placement.location);
        }
        Some(placement)
    }

    /// Tick every live bot once, in id order. Returns how many were ticked.
    pub fn tick(&mut self, ctx: &TickContext, world: &mut W) -> usize {
        let mut ticked = 0;
        for (&agent, slot) in self.agents.iter_mut() {
            if tick_slot(ctx, agent, slot, world).is_some() {
                ticked += 1;
            }
        }
        ticked
    }

    /// Tick one bot. `None` when it is unknown or not alive.
    pub fn tick_agent(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
    ) -> Option<NodeResult> {
        let slot = self.agents.get_mut(&agent)?;
        tick_slot(ctx, agent, slot, world)
    }

    pub fn contains(&self, agent: W::Agent) -> bool {
        self.agents.contains_key(&agent)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> impl Iterator<Item = W::Agent> + '_ {
        self.agents.keys().copied()
    }

    pub fn agent_state(&self, agent: W::Agent) -> Option<AgentState> {
        AgentState::load(&self.agents.get(&agent)?.blackboard)
    }

    /// Mutable access to a bot's state; the blackboard copy is what the tree reads.
    pub fn agent_state_mut(&mut self, agent: W::Agent) -> Option<&mut AgentState> {
        self.agents.get_mut(&agent)?.blackboard.get_mut(AGENT_STATE)
    }

    pub fn blackboard(&self, agent: W::Agent) -> Option<&Blackboard> {
        self.agents.get(&agent).map(|slot| &slot.blackboard)
    }

    pub fn blackboard_mut(&mut self, agent: W::Agent) -> Option<&mut Blackboard> {
        self.agents.get_mut(&agent).map(|slot| &mut slot.blackboard)
    }

    pub fn tree(&self, agent: W::Agent) -> Option<&Tree<W>> {
        self.agents.get(&agent).map(|slot| &slot.tree)
    }

    pub fn pois(&self) -> &PoiPool {
        &self.pois
    }

    /// Number of live bots per phase.
    pub fn phase_counts(&self) -> BTreeMap<Phase, usize> {
        let mut counts = BTreeMap::new();
        for slot in self.agents.values() {
            if let Some(state) = AgentState::load(&slot.blackboard) {
                *counts.entry(state.phase).or_insert(0) += 1;
            }
        }
        counts
    }
}

fn tick_slot<W>(
    ctx: &TickContext,
    agent: W::Agent,
    slot: &mut BotSlot<W>,
    world: &mut W,
) -> Option<NodeResult>
where
    W: BotWorldMut + 'static,
{
    let alive = world.vitals(agent).is_some_and(|v| v.is_alive());
    if !alive {
        return None;
    }
    Some(slot.tree.tick(ctx, agent, world, &mut slot.blackboard))
}
