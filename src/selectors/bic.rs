//! Bayesian Information Criterion selector
//!
//! BIC = -2 * logL + p * ln(N), lower is better. `p = n² + 2·n·d` counts the
//! transition parameters plus diagonal-Gaussian means and variances; `N` is the
//! number of training sequences of the word.

use super::base::{BestCandidate, ModelSelector, Objective, SelectionStrategy};
use crate::models::{ModelFitter, SequenceModel};
use tracing::{debug, trace};

/// Free parameter count used by the BIC penalty
pub fn parameter_count(n_states: usize, n_features: usize) -> usize {
    n_states * n_states + 2 * n_states * n_features
}

/// BIC for a model with the given log-likelihood
pub fn bic_score(log_likelihood: f64, n_states: usize, n_features: usize, n_sequences: usize) -> f64 {
    let p = parameter_count(n_states, n_features) as f64;
    -2.0 * log_likelihood + p * (n_sequences as f64).ln()
}

/// Picks the state count with the lowest BIC
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorBic;

impl<F: ModelFitter> SelectionStrategy<F> for SelectorBic {
    fn select(&self, selector: &ModelSelector<'_, F>) -> Option<F::Model> {
        let n_sequences = selector.sequences().len();
        let mut best = BestCandidate::new(Objective::Minimize);

        for n_states in selector.candidates() {
            let Some(model) = selector.base_model(n_states) else {
                continue;
            };
            let log_ll = match model.score(selector.batch()) {
                Ok(log_ll) => log_ll,
                Err(err) => {
                    debug!("{}: scoring {} states failed: {}", selector.word(), n_states, err);
                    continue;
                }
            };

            let score = bic_score(log_ll, model.n_states(), model.n_features(), n_sequences);
            trace!("{}: n={} logL={:.3} BIC={:.3}", selector.word(), n_states, log_ll, score);
            best.offer(n_states, score, model);
        }

        match best.into_inner() {
            Some((_, model)) => Some(model),
            None => selector.fallback_model(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;
    use crate::error::ScoreError;
    use crate::test_support::{corpus_of, StubFitter};

    #[test]
    fn test_bic_formula() {
        // p = 9 + 2*3*2 = 21
        assert_eq!(parameter_count(3, 2), 21);
        let expected = -2.0 * -100.0 + 21.0 * 4.0_f64.ln();
        assert!((bic_score(-100.0, 3, 2, 4) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_picks_lowest_bic() {
        let corpus = corpus_of(&[("BOOK", 1.0, 4)]);
        let config = SelectorConfig::default();
        let fitter = StubFitter::new(|n, _| Ok(if n == 5 { 500.0 } else { -50.0 }));
        let selector = ModelSelector::new(&corpus, "BOOK", &config, &fitter).unwrap();

        let model = SelectorBic.select(&selector).unwrap();
        assert_eq!(model.n_states(), 5);
    }

    #[test]
    fn test_tie_goes_to_fewer_states() {
        // a single sequence makes ln(N) = 0, so equal logL means equal BIC
        let corpus = corpus_of(&[("BOOK", 1.0, 1)]);
        let config = SelectorConfig::default();
        let fitter = StubFitter::new(|_, _| Ok(-7.0));
        let selector = ModelSelector::new(&corpus, "BOOK", &config, &fitter).unwrap();

        let model = SelectorBic.select(&selector).unwrap();
        assert_eq!(model.n_states(), 2);
    }

    #[test]
    fn test_failed_candidates_skipped() {
        let corpus = corpus_of(&[("BOOK", 1.0, 4)]);
        let config = SelectorConfig::default();
        let fitter = StubFitter::new(|n, _| match n {
            6 => Err(ScoreError::NonFinite),
            7 => Ok(900.0),
            _ => Ok(-50.0),
        })
        .failing_on(&[5]);
        let selector = ModelSelector::new(&corpus, "BOOK", &config, &fitter).unwrap();

        let model = SelectorBic.select(&selector).unwrap();
        assert_eq!(model.n_states(), 7);
    }

    #[test]
    fn test_all_scores_fail_uses_fallback() {
        let corpus = corpus_of(&[("BOOK", 1.0, 4)]);
        let config = SelectorConfig::default();
        let fitter = StubFitter::new(|_, _| Err(ScoreError::NonFinite));
        let selector = ModelSelector::new(&corpus, "BOOK", &config, &fitter).unwrap();

        let model = SelectorBic.select(&selector).unwrap();
        assert_eq!(model.n_states(), 3);
    }

    #[test]
    fn test_fallback_stays_in_range() {
        let corpus = corpus_of(&[("BOOK", 1.0, 4)]);
        let config = SelectorConfig::default().with_range(5, 7);
        let fitter = StubFitter::new(|_, _| Err(ScoreError::Empty));
        let selector = ModelSelector::new(&corpus, "BOOK", &config, &fitter).unwrap();

        let model = SelectorBic.select(&selector).unwrap();
        assert_eq!(model.n_states(), 5);
    }

    #[test]
    fn test_everything_fails_is_none() {
        let corpus = corpus_of(&[("BOOK", 1.0, 4)]);
        let config = SelectorConfig::default().with_range(2, 4);
        let fitter = StubFitter::new(|_, _| Ok(0.0)).failing_on(&[2, 3, 4]);
        let selector = ModelSelector::new(&corpus, "BOOK", &config, &fitter).unwrap();

        assert!(SelectorBic.select(&selector).is_none());
    }
}
