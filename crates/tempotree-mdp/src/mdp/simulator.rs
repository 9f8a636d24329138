use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{ActionRef, Mdp, State};

#[derive(Debug, Clone)]
/// Seeded simulator over an [`Mdp`]; equal seeds replay equal trajectories.
pub struct MdpSimulator<'a> {
    mdp: &'a Mdp,
    rng: ChaCha8Rng,
}

impl<'a> MdpSimulator<'a> {
    /// Create a simulator with deterministic RNG seed.
    pub fn new(mdp: &'a Mdp, seed: u64) -> Self {
        Self {
            mdp,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn mdp(&self) -> &'a Mdp {
        self.mdp
    }

    /// Uniform sample in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        (self.rng.next_u64() as f64) / ((u64::MAX as f64) + 1.0)
    }

    /// Uniform index in `[0, len)`; `len` must be non-zero.
    pub fn pick(&mut self, len: usize) -> usize {
        ((self.uniform() * len as f64) as usize).min(len.saturating_sub(1))
    }

    /// Sample one successor of `action` in `state`.
    /// Inapplicable actions leave the state unchanged.
    pub fn step(&mut self, state: &State, action: ActionRef) -> State {
        let sample = self.uniform();
        self.mdp.sample(state, action, sample)
    }
}
