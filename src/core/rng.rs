//! Central pseudo-random source and weighted selection
//!
//! Every random outcome in turn processing is drawn from one seeded source
//! so that a recorded seed reproduces the whole turn.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Anything that can hand out uniform integers
pub trait RandomSource {
    /// Uniform integer in `[0, bound)`. Returns 0 when `bound` is 0.
    fn next_int(&mut self, bound: u32) -> u32;
}

/// Deterministic game RNG (ChaCha8) owned by the turn processor
#[derive(Debug, Clone)]
pub struct GameRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl GameRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed this source was created from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Shuffle a slice in place (Fisher-Yates over `next_int`)
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        shuffle(self, items);
    }
}

impl RandomSource for GameRng {
    fn next_int(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.inner.gen_range(0..bound)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_int(&mut self, bound: u32) -> u32 {
        (**self).next_int(bound)
    }
}

/// Fisher-Yates shuffle drawing from any [`RandomSource`]
pub fn shuffle<T, R: RandomSource + ?Sized>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.next_int(i as u32 + 1) as usize;
        items.swap(i, j);
    }
}

/// One candidate in a weighted draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomChoice<T> {
    pub object: T,
    pub weight: u32,
}

impl<T> RandomChoice<T> {
    pub fn new(object: T, weight: u32) -> Self {
        Self { object, weight }
    }
}

/// Sum of all weights
pub fn total_weight<T>(choices: &[RandomChoice<T>]) -> u32 {
    choices.iter().map(|c| c.weight).sum()
}

/// Pick the first choice whose cumulative weight exceeds `draw`
///
/// `draw` must lie in `[0, total_weight)`; anything else yields `None`.
pub fn select_by_draw<T>(choices: &[RandomChoice<T>], draw: u32) -> Option<&T> {
    let mut cumulative = 0u32;
    for choice in choices {
        cumulative += choice.weight;
        if draw < cumulative {
            return Some(&choice.object);
        }
    }
    None
}

/// Weighted single-shot selection: exactly one draw per call
///
/// Returns `None` when the list is empty or all weights are zero; no random
/// number is consumed in that case.
pub fn weighted_choice<'a, T, R: RandomSource + ?Sized>(
    rng: &mut R,
    choices: &'a [RandomChoice<T>],
) -> Option<&'a T> {
    let total = total_weight(choices);
    if total == 0 {
        return None;
    }
    let draw = rng.next_int(total);
    select_by_draw(choices, draw)
}
