//! Shared selector state and the strategy trait

use crate::config::SelectorConfig;
use crate::data::{Sequence, SequenceBatch, SequenceCorpus};
use crate::error::{Error, Result};
use crate::models::ModelFitter;
use std::ops::RangeInclusive;
use tracing::{debug, info};

/// A word's training data plus search configuration, handed to every strategy
///
/// Borrows the corpus immutably; strategies that need other subsets of the
/// word's sequences build them locally instead of overwriting `batch`.
pub struct ModelSelector<'a, F: ModelFitter> {
    corpus: &'a SequenceCorpus,
    word: &'a str,
    sequences: &'a [Sequence],
    batch: &'a SequenceBatch,
    config: &'a SelectorConfig,
    fitter: &'a F,
}

impl<'a, F: ModelFitter> ModelSelector<'a, F> {
    pub fn new(
        corpus: &'a SequenceCorpus,
        word: &'a str,
        config: &'a SelectorConfig,
        fitter: &'a F,
    ) -> Result<Self> {
        config.validate()?;
        let sequences = corpus
            .sequences(word)
            .ok_or_else(|| Error::UnknownWord(word.to_string()))?;
        let batch = corpus
            .batch(word)
            .ok_or_else(|| Error::UnknownWord(word.to_string()))?;

        Ok(Self {
            corpus,
            word,
            sequences,
            batch,
            config,
            fitter,
        })
    }

    /// Word being modelled
    pub fn word(&self) -> &str {
        self.word
    }

    pub fn corpus(&self) -> &SequenceCorpus {
        self.corpus
    }

    /// The word's training sequences
    pub fn sequences(&self) -> &[Sequence] {
        self.sequences
    }

    /// The word's flattened training data
    pub fn batch(&self) -> &SequenceBatch {
        self.batch
    }

    pub fn config(&self) -> &SelectorConfig {
        self.config
    }

    /// Candidate state counts in ascending order
    pub fn candidates(&self) -> RangeInclusive<usize> {
        self.config.candidates()
    }

    /// Fit on the word's full data; `None` if fitting failed
    pub fn base_model(&self, n_states: usize) -> Option<F::Model> {
        self.fit_on(self.batch, n_states)
    }

    /// Fit on the clamped fallback state count
    pub fn fallback_model(&self) -> Option<F::Model> {
        self.base_model(self.config.fallback_states())
    }

    /// Fit on an arbitrary batch (e.g. a cross-validation training fold)
    pub fn fit_on(&self, batch: &SequenceBatch, n_states: usize) -> Option<F::Model> {
        match self
            .fitter
            .fit(batch, n_states, self.config.random_state, self.config.max_iter)
        {
            Ok(model) => {
                if self.config.verbose {
                    info!("model created for {} with {} states", self.word, n_states);
                } else {
                    debug!("model created for {} with {} states", self.word, n_states);
                }
                Some(model)
            }
            Err(err) => {
                if self.config.verbose {
                    info!("failure on {} with {} states: {}", self.word, n_states, err);
                } else {
                    debug!("failure on {} with {} states: {}", self.word, n_states, err);
                }
                None
            }
        }
    }
}

/// A model selection policy
pub trait SelectionStrategy<F: ModelFitter> {
    /// Pick a model for the selector's word. Fit and score failures are
    /// absorbed; `None` means even the fallback fit failed.
    fn select(&self, selector: &ModelSelector<'_, F>) -> Option<F::Model>;
}

/// Whether lower or higher criterion values win
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Objective {
    Minimize,
    Maximize,
}

/// Tracks the first candidate reaching the strict optimum
pub(crate) struct BestCandidate<T> {
    objective: Objective,
    best: Option<(usize, f64, T)>,
}

impl<T> BestCandidate<T> {
    pub(crate) fn new(objective: Objective) -> Self {
        Self {
            objective,
            best: None,
        }
    }

    /// Replace the current best only on strict improvement; NaN never wins
    pub(crate) fn offer(&mut self, n_states: usize, score: f64, value: T) -> bool {
        if score.is_nan() {
            return false;
        }
        let improves = match &self.best {
            None => true,
            Some((_, best, _)) => match self.objective {
                Objective::Minimize => score < *best,
                Objective::Maximize => score > *best,
            },
        };
        if improves {
            self.best = Some((n_states, score, value));
        }
        improves
    }

    pub(crate) fn into_inner(self) -> Option<(usize, T)> {
        self.best.map(|(n_states, _, value)| (n_states, value))
    }
}
