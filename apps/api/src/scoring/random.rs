//! Random source for the two stand-in signals (résumé presentation bonus and
//! interview emotion). Scorers never touch `rand` directly; they draw through
//! `RandomSource` so tests can pin the value.

use std::ops::RangeInclusive;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource: Send + Sync {
    /// Uniform draw from the closed interval.
    fn draw(&self, range: RangeInclusive<u32>) -> u32;
}

/// `StdRng`-backed source. Seeded from entropy in production, or from
/// `SCORING_SEED` for reproducible runs.
pub struct SeededSource {
    rng: Mutex<StdRng>,
}

impl SeededSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl RandomSource for SeededSource {
    fn draw(&self, range: RangeInclusive<u32>) -> u32 {
        // A poisoned lock only means another draw panicked; the RNG state is still usable.
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rng.gen_range(range)
    }
}

/// Always returns the same value, clamped into the requested range.
#[cfg(test)]
pub struct FixedSource(pub u32);

#[cfg(test)]
impl RandomSource for FixedSource {
    fn draw(&self, range: RangeInclusive<u32>) -> u32 {
        self.0.clamp(*range.start(), *range.end())
    }
}
