//! Deterministic randomness for card arrangement.
//!
//! Renderers jitter symbol placement (the starting angle of the circle, the
//! horizontal offset of each name). The jitter comes from a ChaCha8 stream
//! derived from a base seed, the card index and the variant, so rendering a
//! card twice gives the same raster and two renderers never share state.
//!
//! ```
//! use dobble_cards::cards::{CardVariant, LayoutRng};
//!
//! let base = LayoutRng::new(42);
//! let mut a = base.for_card(3, CardVariant::Image);
//! let mut b = base.for_card(3, CardVariant::Image);
//! assert_eq!(a.unit(), b.unit());
//! ```

use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;

use super::card::CardVariant;

/// Seeded random stream for one card rendering.
#[derive(Clone, Debug)]
pub struct LayoutRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl LayoutRng {
    /// Create a stream from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Independent stream for one card variant.
    ///
    /// Depends only on the base seed, not on how much of this stream has
    /// been consumed. `FxHasher` keeps the derived seed stable across builds.
    #[must_use]
    pub fn for_card(&self, card_index: usize, variant: CardVariant) -> Self {
        let mut hasher = FxHasher::default();
        self.seed.hash(&mut hasher);
        card_index.hash(&mut hasher);
        variant.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in `[0, 1)`.
    pub fn unit(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Uniform angle in radians, `[0, 2π)`.
    pub fn angle(&mut self) -> f32 {
        self.unit() * std::f32::consts::TAU
    }

    /// Uniform value in `[0, max)`; zero when `max` is not positive.
    pub fn up_to(&mut self, max: f32) -> f32 {
        if max > 0.0 {
            self.inner.gen_range(0.0..max)
        } else {
            0.0
        }
    }
}

impl Default for LayoutRng {
    fn default() -> Self {
        Self::new(0)
    }
}
