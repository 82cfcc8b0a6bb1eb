//! Two-outcome fair coin used to measure a quantum move.
//!
//! The engine only needs "one of two outcomes with equal probability"; where
//! the bits come from is up to the caller.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use tracing::debug;

/// Source of fair two-way outcomes.
pub trait FairCoin {
    /// Flips the coin. `false` selects the first of two candidates.
    fn flip(&mut self) -> bool;

    /// Picks one of two values with equal probability.
    fn pick<T: Copy>(&mut self, pair: [T; 2]) -> T
    where
        Self: Sized,
    {
        if self.flip() { pair[1] } else { pair[0] }
    }
}

impl<C: FairCoin + ?Sized> FairCoin for &mut C {
    fn flip(&mut self) -> bool {
        (**self).flip()
    }
}

/// Pseudo-random coin.
#[derive(Debug, Clone)]
pub struct RandomCoin {
    rng: StdRng,
}

impl RandomCoin {
    /// Coin seeded from the operating system.
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible coin.
    pub fn seeded(seed: u64) -> Self {
        debug!(seed, "Seeding coin");
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomCoin {
    fn default() -> Self {
        Self::from_os()
    }
}

impl FairCoin for RandomCoin {
    fn flip(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }
}

/// Coin that replays a fixed sequence, then alternates.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCoin {
    script: VecDeque<bool>,
    last: bool,
}

impl ScriptedCoin {
    /// Replays `outcomes` in order.
    pub fn new(outcomes: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: outcomes.into_iter().collect(),
            last: true,
        }
    }
}

impl FairCoin for ScriptedCoin {
    fn flip(&mut self) -> bool {
        let outcome = self.script.pop_front().unwrap_or(!self.last);
        self.last = outcome;
        outcome
    }
}
