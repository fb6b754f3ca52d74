//! Deterministic utilities for reproducible training
//!
//! Provides an LCG-based RNG, seed derivation for independent streams,
//! and the split tie-breaking order, so that identical inputs produce
//! identical forests across platforms and runs.

/// Linear Congruential Generator for deterministic pseudo-randomness
/// Uses constants from Numerical Recipes (glibc)
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    // LCG constants (compatible with glibc)
    const MULTIPLIER: u64 = 1_103_515_245;
    const INCREMENT: u64 = 12_345;
    const MODULUS: u64 = 1 << 31;

    pub fn new(seed: u64) -> Self {
        Self {
            state: seed % Self::MODULUS,
        }
    }

    /// Generate next raw value in range [0, 2^31)
    pub fn next_u31(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        self.state & (Self::MODULUS - 1)
    }

    /// Uniform value in [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        self.next_u31() as f64 / Self::MODULUS as f64
    }

    /// Uniform index in [0, len)
    ///
    /// Scales by the high bits; the low bits of an LCG cycle with short periods.
    pub fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_u31() * len as u64) >> 31) as usize
    }

    /// Uniform value in [low, high)
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Uniform integer in [low, high]
    pub fn range_inclusive(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        low + self.next_index((high - low + 1) as usize) as i64
    }

    /// Pick one element of a non-empty slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.next_index(items.len()))
    }
}

/// Deterministic xxhash64-style mixing of a seed and a stream index.
///
/// Each tree of a forest draws its bootstrap sample from its own stream,
/// so trees can be built in any order.
pub fn derive_seed(seed: u64, stream: u64) -> u64 {
    const PRIME1: u64 = 0x9E37_79B1_85EB_CA87;
    const PRIME2: u64 = 0xC2B2_AE3D_27D4_EB4F;
    const PRIME3: u64 = 0x1656_67B1_9E37_79F9;
    const PRIME5: u64 = 0x85EB_CA77_C2B2_AE63;

    let mut h = seed.wrapping_add(PRIME5);
    h = h.wrapping_add(stream.wrapping_mul(PRIME3));
    h = h.rotate_left(17).wrapping_mul(PRIME2);

    h ^= h >> 33;
    h = h.wrapping_mul(PRIME1);
    h ^= h >> 29;
    h = h.wrapping_mul(PRIME2);
    h ^= h >> 32;

    h
}

/// Deterministic tie-breaker for split selection
/// Orders equal-gain candidates by (feature_idx, threshold rank)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    pub rank: usize,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, rank: usize) -> Self {
        Self { feature_idx, rank }
    }
}
