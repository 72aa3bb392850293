//! Cross-validated likelihood selector
//!
//! Each candidate is trained on the training folds of the word's sequences and
//! scored on the held-out fold. Words with two sequences or fewer cannot be
//! split; their single full-data fit is scored on its own training data.
//! Fold data is assembled locally, the word's stored batch is never touched.

use super::base::{BestCandidate, ModelSelector, Objective, SelectionStrategy};
use crate::config::FoldAveraging;
use crate::data::{combine_sequences, KFold};
use crate::models::{ModelFitter, SequenceModel};
use tracing::{debug, trace};

/// Minimum number of sequences needed before folding
const MIN_SEQUENCES_FOR_FOLDS: usize = 3;

/// Picks the state count with the highest mean held-out log-likelihood
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorCv;

impl SelectorCv {
    /// Held-out log-likelihood of every fold, `None` if any fold failed
    fn fold_scores<F: ModelFitter>(selector: &ModelSelector<'_, F>, n_states: usize) -> Option<Vec<f64>> {
        let sequences = selector.sequences();
        let word = selector.word();

        if sequences.len() < MIN_SEQUENCES_FOR_FOLDS {
            let model = selector.base_model(n_states)?;
            return match model.score(selector.batch()) {
                Ok(log_ll) => Some(vec![log_ll]),
                Err(err) => {
                    debug!("{}: scoring {} states failed: {}", word, n_states, err);
                    None
                }
            };
        }

        let n_splits = selector.config().n_folds.min(sequences.len());
        let folds = match KFold::new(n_splits).split(sequences.len()) {
            Ok(folds) => folds,
            Err(err) => {
                debug!("{}: cannot split into folds: {}", word, err);
                return None;
            }
        };

        let mut scores = Vec::with_capacity(folds.len());
        for (idx, fold) in folds.iter().enumerate() {
            let (train, test) = match (
                combine_sequences(&fold.train, sequences),
                combine_sequences(&fold.test, sequences),
            ) {
                (Ok(train), Ok(test)) => (train, test),
                (Err(err), _) | (_, Err(err)) => {
                    debug!("{}: fold {} could not be assembled: {}", word, idx, err);
                    return None;
                }
            };

            let model = selector.fit_on(&train, n_states)?;
            match model.score(&test) {
                Ok(log_ll) => scores.push(log_ll),
                Err(err) => {
                    debug!("{}: fold {} with {} states failed to score: {}", word, idx, n_states, err);
                    return None;
                }
            }
        }

        Some(scores)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

impl<F: ModelFitter> SelectionStrategy<F> for SelectorCv {
    fn select(&self, selector: &ModelSelector<'_, F>) -> Option<F::Model> {
        let averaging = selector.config().fold_averaging;
        let mut running: Vec<f64> = Vec::new();
        let mut best = BestCandidate::new(Objective::Maximize);

        for n_states in selector.candidates() {
            let Some(scores) = Self::fold_scores(selector, n_states) else {
                continue;
            };

            let score = match averaging {
                FoldAveraging::PerCandidate => mean(&scores),
                FoldAveraging::Cumulative => {
                    running.extend_from_slice(&scores);
                    mean(&running)
                }
            };
            trace!("{}: n={} CV={:.3}", selector.word(), n_states, score);
            best.offer(n_states, score, ());
        }

        let n_states = best
            .into_inner()
            .map_or_else(|| selector.config().fallback_states(), |(n_states, _)| n_states);
        selector.base_model(n_states)
    }
}
