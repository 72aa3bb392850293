//! Scripted fitter and corpus builders for unit tests

use crate::data::{SequenceBatch, SequenceCorpus};
use crate::error::{FitError, ScoreError};
use crate::models::{ModelFitter, SequenceModel};
use indexmap::IndexMap;
use ndarray::Array2;
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) type ScoreFn = dyn Fn(usize, &SequenceBatch) -> Result<f64, ScoreError>;

/// Model whose likelihoods come from a closure of (n_states, batch)
#[derive(Clone)]
pub(crate) struct StubModel {
    n_states: usize,
    n_features: usize,
    scorer: Rc<ScoreFn>,
}

impl StubModel {
    pub(crate) fn new(
        n_states: usize,
        scorer: impl Fn(usize, &SequenceBatch) -> Result<f64, ScoreError> + 'static,
    ) -> Self {
        Self {
            n_states,
            n_features: 2,
            scorer: Rc::new(scorer),
        }
    }
}

impl SequenceModel for StubModel {
    fn n_states(&self) -> usize {
        self.n_states
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn score(&self, batch: &SequenceBatch) -> Result<f64, ScoreError> {
        (self.scorer)(self.n_states, batch)
    }
}

/// Fitter that fails on chosen state counts and records every call
pub(crate) struct StubFitter {
    failing: Vec<usize>,
    scorer: Rc<ScoreFn>,
    fits: RefCell<Vec<(usize, usize)>>,
}

impl StubFitter {
    pub(crate) fn new(
        scorer: impl Fn(usize, &SequenceBatch) -> Result<f64, ScoreError> + 'static,
    ) -> Self {
        Self {
            failing: vec![],
            scorer: Rc::new(scorer),
            fits: RefCell::new(vec![]),
        }
    }

    pub(crate) fn failing_on(mut self, states: &[usize]) -> Self {
        self.failing.extend_from_slice(states);
        self
    }

    /// (n_states, training frames) for every fit attempted, in order
    pub(crate) fn fits(&self) -> Vec<(usize, usize)> {
        self.fits.borrow().clone()
    }
}

impl ModelFitter for StubFitter {
    type Model = StubModel;

    fn fit(
        &self,
        batch: &SequenceBatch,
        n_states: usize,
        _seed: u64,
        _max_iter: usize,
    ) -> Result<StubModel, FitError> {
        self.fits.borrow_mut().push((n_states, batch.n_frames()));
        if self.failing.contains(&n_states) {
            return Err(FitError::NonFinite { iteration: 0 });
        }
        Ok(StubModel {
            n_states,
            n_features: batch.n_features(),
            scorer: Rc::clone(&self.scorer),
        })
    }
}

/// Corpus where every frame of `word` has value `value` in both features;
/// each word gets `n_sequences` sequences of 3 frames.
pub(crate) fn corpus_of(words: &[(&str, f64, usize)]) -> SequenceCorpus {
    let mut map = IndexMap::new();
    for &(word, value, n_sequences) in words {
        let sequences = (0..n_sequences)
            .map(|_| Array2::from_elem((3, 2), value))
            .collect();
        map.insert(word.to_string(), sequences);
    }
    SequenceCorpus::new(map).unwrap()
}

/// Value identifying which word a batch came from
pub(crate) fn word_value(batch: &SequenceBatch) -> f64 {
    batch.features()[[0, 0]]
}
