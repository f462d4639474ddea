//! Deterministic pseudo-random generator shared by the permutation and the chime builder.
//!
//! One [`Rng64`] is created per run and passed by `&mut` to each consumer in a fixed order, so a
//! given seed reproduces both the reveal order and the chime weights bit for bit.

use xxhash_rust::xxh3::xxh3_64;

/// SplitMix64 generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    /// Create a generator from a raw seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Create a generator keyed by an identity string (see [`seed_from_identity`]).
    pub fn from_identity(identity: &str) -> Self {
        Self::new(seed_from_identity(identity))
    }

    /// Next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform integer in `[0, bound)`, without modulo bias.
    ///
    /// `bound == 0` returns 0 and consumes no draws.
    pub fn next_below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        // Lemire: multiply into 128 bits, reject the short low band.
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let m = u128::from(self.next_u64()) * u128::from(bound);
            if (m as u64) >= threshold {
                return (m >> 64) as u64;
            }
        }
    }
}

/// Stable 64-bit seed for an identity string.
///
/// Unlike `std::hash`, XXH3 output does not change between processes, builds or platforms.
pub fn seed_from_identity(identity: &str) -> u64 {
    xxh3_64(identity.as_bytes())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/rng.rs"]
mod tests;
