//! Selector trait and built-in selectors.
//!
//! While the moderator is awaiting selection it presents the ranked
//! proposals to a [`Selector`] and waits for an index. The trait abstracts
//! who chooses: a person at a terminal, a script, or a seeded random
//! policy.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use parliament_types::Proposal;

/// Errors a selector can report instead of an index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// The selector declined to choose, or ran out of time.
    #[error("no selection was made")]
    NoSelection,

    /// An internal error in the selector.
    #[error("selector error: {message}")]
    Internal {
        /// Description of the error.
        message: String,
    },
}

/// Chooses one of the ranked proposals.
pub trait Selector {
    /// Pick an index into `proposals` (ranked best first) for `round`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NoSelection`] to abstain.
    fn select(&mut self, proposals: &[Proposal], round: u32) -> Result<usize, SelectionError>;
}

/// Always takes the top-ranked proposal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopRankedSelector;

impl TopRankedSelector {
    /// Create the selector.
    pub const fn new() -> Self {
        Self
    }
}

impl Selector for TopRankedSelector {
    fn select(&mut self, proposals: &[Proposal], _round: u32) -> Result<usize, SelectionError> {
        if proposals.is_empty() {
            return Err(SelectionError::NoSelection);
        }
        Ok(0)
    }
}

/// Replays a fixed sequence of answers; `None` entries abstain.
///
/// Once the script runs out every call abstains.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSelector {
    script: VecDeque<Option<usize>>,
}

impl ScriptedSelector {
    /// Create a selector from a script.
    pub fn new(script: impl IntoIterator<Item = Option<usize>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Answers not yet given.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Selector for ScriptedSelector {
    fn select(&mut self, _proposals: &[Proposal], round: u32) -> Result<usize, SelectionError> {
        let answer = self.script.pop_front().flatten();
        tracing::debug!(round, ?answer, "scripted selection");
        answer.ok_or(SelectionError::NoSelection)
    }
}

/// Picks at random, favouring higher ranks: the proposal at rank `i` of
/// `n` has weight `n - i`.
#[derive(Debug, Clone)]
pub struct WeightedRandomSelector {
    rng: StdRng,
}

impl WeightedRandomSelector {
    /// Create a selector with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Selector for WeightedRandomSelector {
    fn select(&mut self, proposals: &[Proposal], _round: u32) -> Result<usize, SelectionError> {
        let count = proposals.len();
        if count == 0 {
            return Err(SelectionError::NoSelection);
        }
        let ranks: Vec<usize> = (0..count).collect();
        ranks
            .choose_weighted(&mut self.rng, |&rank| count.saturating_sub(rank))
            .copied()
            .map_err(|e| SelectionError::Internal {
                message: e.to_string(),
            })
    }
}
