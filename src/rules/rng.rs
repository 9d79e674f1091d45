use serde::{Deserialize, Serialize};

const LCG_MULTIPLIER: u64 = 6364136223846793005;
const LCG_INCREMENT: u64 = 1442695040888963407;
const FNV_OFFSET: u64 = 1469598103934665603;
const FNV_PRIME: u64 = 1099511628211;
const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seeded pseudo-random source for a single case.
///
/// Draws advance an internal LCG state. `fork` derives children from the
/// construction seed only, so forking never moves the parent's sequence and
/// the same `(seed, label)` pair always produces the same child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRng {
    seed: u64,
    state: u64,
}

impl CaseRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            state: mix64(seed ^ GOLDEN_GAMMA),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Independent sub-stream keyed by `(seed, label)`.
    pub fn fork(&self, label: &str) -> CaseRng {
        CaseRng::new(fork_seed(self.seed, label))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        // Low LCG bits are short-period; only hand out the mixed state.
        mix64(self.state)
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in the inclusive range `[min, max]`.
    pub fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        let span = (max - min) as u64 + 1;
        min + (self.next_u64() % span) as i64
    }

    pub fn below(&mut self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        (self.next_u64() % upper as u64) as usize
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.below(items.len());
        items.get(idx)
    }

    /// Weighted pick; non-positive weights are never chosen.
    pub fn weighted_choice<'a, T>(&mut self, items: &'a [(T, f64)]) -> Option<&'a T> {
        let total: f64 = items
            .iter()
            .map(|(_, weight)| weight.max(0.0))
            .sum();
        if total <= 0.0 {
            return None;
        }
        let pick = self.next_f64() * total;
        let mut cumulative = 0.0;
        for (value, weight) in items {
            let weight = weight.max(0.0);
            if weight <= 0.0 {
                continue;
            }
            cumulative += weight;
            if pick < cumulative {
                return Some(value);
            }
        }
        items
            .iter()
            .rev()
            .find(|(_, weight)| *weight > 0.0)
            .map(|(value, _)| value)
    }

    /// Box-Muller draw; consumes two uniforms per call.
    pub fn gaussian(&mut self, mean: f64, sigma: f64) -> f64 {
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        let radius = (-2.0 * u1.ln()).sqrt();
        mean + sigma * radius * (std::f64::consts::TAU * u2).cos()
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for idx in (1..items.len()).rev() {
            let swap = self.below(idx + 1);
            items.swap(idx, swap);
        }
    }

    /// `count` distinct elements in draw order, without replacement.
    pub fn sample<T: Clone>(&mut self, items: &[T], count: usize) -> Vec<T> {
        let mut pool: Vec<T> = items.to_vec();
        let take = count.min(pool.len());
        for idx in 0..take {
            let swap = idx + self.below(pool.len() - idx);
            pool.swap(idx, swap);
        }
        pool.truncate(take);
        pool
    }
}

/// Child seed for `fork`: FNV-1a over `"{seed}:{label}"`, finished with a
/// 64-bit avalanche mix.
pub fn fork_seed(seed: u64, label: &str) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in seed
        .to_string()
        .as_bytes()
        .iter()
        .chain(b":".iter())
        .chain(label.as_bytes().iter())
    {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    mix64(hash)
}

pub fn hash_label(value: &str) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in value.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// SplitMix64 finalizer. Bijective on `u64`.
pub fn mix64(value: u64) -> u64 {
    let mut z = value;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

pub(crate) fn golden_step(index: u64) -> u64 {
    index.wrapping_mul(GOLDEN_GAMMA)
}
