//! Deterministic RNG helpers.
//!
//! Small and dependency-free so that a match replays identically for a given seed. Not
//! cryptographic.

pub trait DeterministicRng {
    fn next_u64(&mut self) -> u64;

    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform in `[0, 1)` with 53 bits of precision.
    fn next_f64_unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn next_f32_unit(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    fn next_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }

    /// Uniform integer in `[0, bound)`. Returns 0 for `bound == 0`.
    fn below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        // Lemire's multiply-shift; the bias is negligible for the small bounds used here.
        ((u128::from(self.next_u64()) * u128::from(bound)) >> 64) as u64
    }

    /// Uniform float in `[lo, hi)`; returns `lo` when the range is empty.
    fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        lo + (hi - lo) * self.next_f32_unit()
    }

    fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        lo + (hi - lo) * self.next_f64_unit()
    }

    /// Bernoulli trial with probability `p` (clamped to `[0, 1]`).
    fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.next_f64_unit() < p
    }
}

/// SplitMix64: good seeding RNG and small deterministic generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn step(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        mix64(self.state)
    }
}

impl DeterministicRng for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.step()
    }
}

pub fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

/// Seed for one `(agent, stream)` pair at one tick.
pub fn derive_seed(global_seed: u64, agent_id: u64, tick: u64, stream: u64) -> u64 {
    let x = global_seed
        ^ mix64(agent_id.wrapping_add(0x9E3779B97F4A7C15))
        ^ mix64(tick.rotate_left(17) ^ stream);
    mix64(x)
}

/// Probability that an event with the given per-second rate happens within `elapsed` seconds.
///
/// Keeps random gestures independent of the tick cadence.
pub fn rate_to_probability(rate_per_second: f64, elapsed_seconds: f64) -> f64 {
    if rate_per_second <= 0.0 || elapsed_seconds <= 0.0 {
        return 0.0;
    }
    1.0 - (-rate_per_second * elapsed_seconds).exp()
}
