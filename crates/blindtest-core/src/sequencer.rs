//! Clip ordering and silence interleaving.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use blindtest_models::{ClipPlan, SilenceSpec, Timeline};

/// Orders planned clips and inserts silence between them.
///
/// Stateless: the random source is passed to each call, so a seeded
/// generator reproduces the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sequencer {
    randomize: bool,
    silence: SilenceSpec,
}

impl Sequencer {
    pub fn new(randomize: bool, silence: SilenceSpec) -> Self {
        Self { randomize, silence }
    }

    pub fn randomize(&self) -> bool {
        self.randomize
    }

    pub fn silence(&self) -> SilenceSpec {
        self.silence
    }

    /// Build the timeline for `clips`.
    ///
    /// With `randomize` the clips get a uniform random permutation
    /// (Fisher-Yates); otherwise input order is kept exactly.
    pub fn sequence<R>(&self, mut clips: Vec<ClipPlan>, rng: &mut R) -> Timeline
    where
        R: Rng + ?Sized,
    {
        if clips.is_empty() {
            return Timeline::empty();
        }

        if self.randomize {
            clips.shuffle(rng);
        }

        debug!(
            clips = clips.len(),
            randomize = self.randomize,
            silence_ms = self.silence.length.as_millis() as u64,
            "Sequencing timeline"
        );

        Timeline::interleave(clips, self.silence)
    }
}
