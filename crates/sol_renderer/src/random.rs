//! Xorshift random number generation for the path tracer.
//!
//! Every worker owns one [`RandomSeries`] and mutates it in place. The
//! sequence for a given seed is fixed, so noise patterns are reproducible.

use rand::RngCore;

/// Seed every worker starts from under [`crate::SeedPolicy::PerWorker`].
pub const DEFAULT_SEED: u32 = 23528812;

/// Largest f32 strictly below 1.0.
const ONE_BELOW: f32 = 1.0 - f32::EPSILON / 2.0;

/// Xorshift32 state.
///
/// The state is never zero: zero is a fixed point of the shift sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomSeries {
    state: u32,
}

impl RandomSeries {
    /// Create a series from a seed. Returns `None` for a zero seed.
    pub fn new(seed: u32) -> Option<Self> {
        (seed != 0).then_some(Self { state: seed })
    }

    /// Series for one tile, derived from the base seed and the tile index.
    ///
    /// Mixes the pair with the splitmix64 finalizer so neighbouring tiles get
    /// unrelated streams.
    pub fn for_tile(seed: u32, tile_index: usize) -> Self {
        let mut z = ((seed as u64) << 32) ^ (tile_index as u64);
        z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;

        let folded = (z as u32) ^ ((z >> 32) as u32);
        Self {
            state: if folded == 0 { DEFAULT_SEED } else { folded },
        }
    }

    /// Current state word.
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Advance the state and return it.
    #[inline]
    pub fn next_state(&mut self) -> u32 {
        let mut s = self.state;
        s ^= s << 13;
        s ^= s >> 17;
        s ^= s << 5;
        self.state = s;
        s
    }

    /// Uniform float in [0, 1).
    #[inline]
    pub fn rand_f32_uni(&mut self) -> f32 {
        let s = self.next_state();
        let u = (s >> 1) as f32 / (u32::MAX >> 1) as f32;
        // Large states round up to exactly 1.0 in f32
        u.min(ONE_BELOW)
    }

    /// Uniform float in [-1, 1).
    #[inline]
    pub fn rand_f32_bi(&mut self) -> f32 {
        -1.0 + 2.0 * self.rand_f32_uni()
    }
}

impl Default for RandomSeries {
    fn default() -> Self {
        Self {
            state: DEFAULT_SEED,
        }
    }
}

impl RngCore for RandomSeries {
    fn next_u32(&mut self) -> u32 {
        self.next_state()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_state() as u64;
        let lo = self.next_state() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_state().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
