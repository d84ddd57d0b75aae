use crate::{rng, AgentId, SplitMix64};

/// One host tick.
///
/// `now_seconds` is read from the simulation clock once per tick; every node evaluated during
/// that tick compares deadlines against this single value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    pub now_seconds: f64,
    pub dt_seconds: f32,
    pub seed: u64,
}

impl TickContext {
    /// Context for tick `tick` of a fixed-step loop starting at time zero.
    pub fn fixed_step(tick: u64, dt_seconds: f32, seed: u64) -> Self {
        Self {
            tick,
            now_seconds: tick as f64 * f64::from(dt_seconds),
            dt_seconds,
            seed,
        }
    }

    /// RNG stream private to `agent` for this tick.
    pub fn rng_for_agent<A: AgentId>(&self, agent: A, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(self.seed, agent.stable_id(), self.tick, stream);
        SplitMix64::new(seed)
    }
}
