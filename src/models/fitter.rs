//! Fitting and scoring seams used by the selection layer

use crate::data::SequenceBatch;
use crate::error::{FitError, ScoreError};

/// A trained sequence model that can score batches of sequences
pub trait SequenceModel {
    /// Number of hidden states
    fn n_states(&self) -> usize;

    /// Feature dimensionality the model was trained on
    fn n_features(&self) -> usize;

    /// Total log-likelihood of all sequences in the batch
    fn score(&self, batch: &SequenceBatch) -> Result<f64, ScoreError>;
}

/// Trains a model with a given number of hidden states
pub trait ModelFitter {
    type Model: SequenceModel;

    /// Fit a model on `batch`. Must be deterministic for a given `seed`.
    fn fit(
        &self,
        batch: &SequenceBatch,
        n_states: usize,
        seed: u64,
        max_iter: usize,
    ) -> Result<Self::Model, FitError>;
}
