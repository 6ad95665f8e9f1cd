use std::sync::{Arc, Mutex};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// In-place Durstenfeld shuffle. Walks from index 1 upward and swaps each
/// element with a uniformly chosen one in `[0, i]`.
pub fn shuffle_with<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in 1..items.len() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Shared randomness source for question and choice ordering.
#[derive(Debug, Clone)]
pub struct Randomizer {
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl Randomizer {
    pub fn from_os_rng() -> Self {
        Self::from_rng(ChaCha8Rng::from_os_rng())
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_config(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_os_rng(),
        }
    }

    fn from_rng(rng: ChaCha8Rng) -> Self {
        Self {
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    pub fn shuffle<T>(&self, items: &mut [T]) {
        // A poisoned lock still holds a usable generator
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        shuffle_with(items, &mut *rng);
    }
}
