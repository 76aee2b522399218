use companion_core::RngOracle;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// [`RngOracle`] backed by `rand`'s standard generator.
pub struct StdRngOracle {
    rng: StdRng,
}

impl StdRngOracle {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is given, otherwise from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl RngOracle for StdRngOracle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}
