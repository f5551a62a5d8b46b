//! Gap placement randomness
//!
//! Spawning is the only random decision in the simulation, so it goes
//! through a swappable source. Seeded sources replay identically.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Supplies the vertical placement of each new gap
pub trait GapSource {
    /// A value in the half-open range `[lo, hi)`
    fn next_gap(&mut self, lo: f32, hi: f32) -> f32;
}

/// PCG-backed uniform gap placement
#[derive(Debug, Clone)]
pub struct SeededGaps {
    seed: u64,
    rng: Pcg32,
}

impl SeededGaps {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seed this source was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the sequence from the creation seed
    pub fn reset(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
    }
}

impl GapSource for SeededGaps {
    fn next_gap(&mut self, lo: f32, hi: f32) -> f32 {
        debug_assert!(hi > lo, "empty gap range [{lo}, {hi})");
        self.rng.random_range(lo..hi)
    }
}

/// Replays a fixed list of gap values, then repeats the last one
///
/// Values are clamped into the requested range so a script written for one
/// tuning never produces an out-of-bounds gap under another.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptedGaps {
    queue: VecDeque<f32>,
    last: Option<f32>,
}

impl ScriptedGaps {
    pub fn new(values: impl IntoIterator<Item = f32>) -> Self {
        Self {
            queue: values.into_iter().collect(),
            last: None,
        }
    }
}

impl GapSource for ScriptedGaps {
    fn next_gap(&mut self, lo: f32, hi: f32) -> f32 {
        let value = self.queue.pop_front().or(self.last).unwrap_or(lo);
        self.last = Some(value);
        // Keep inside [lo, hi)
        value.clamp(lo, hi - f32::EPSILON * hi.abs().max(1.0))
    }
}
