//! Discriminative Information Criterion selector
//!
//! DIC = log P(X_word) - mean(log P(X_other)) over every other vocabulary
//! word, higher is better. Other words that a candidate fails to score are
//! left out of the mean; a candidate with no scorable other word is skipped.

use super::base::{BestCandidate, ModelSelector, Objective, SelectionStrategy};
use crate::data::SequenceBatch;
use crate::models::{ModelFitter, SequenceModel};
use tracing::{debug, trace};

/// DIC from the target likelihood and the other words' likelihoods
pub fn dic_score(target: f64, anti_likelihoods: &[f64]) -> Option<f64> {
    if anti_likelihoods.is_empty() {
        return None;
    }
    let mean = anti_likelihoods.iter().sum::<f64>() / anti_likelihoods.len() as f64;
    Some(target - mean)
}

/// Picks the state count with the highest DIC
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorDic;

impl<F: ModelFitter> SelectionStrategy<F> for SelectorDic {
    fn select(&self, selector: &ModelSelector<'_, F>) -> Option<F::Model> {
        let others: Vec<(&str, &SequenceBatch)> = selector
            .corpus()
            .batches()
            .filter(|(word, _)| *word != selector.word())
            .collect();

        let mut best = BestCandidate::new(Objective::Maximize);

        for n_states in selector.candidates() {
            let Some(model) = selector.base_model(n_states) else {
                continue;
            };
            let target = match model.score(selector.batch()) {
                Ok(log_ll) => log_ll,
                Err(err) => {
                    debug!("{}: scoring {} states failed: {}", selector.word(), n_states, err);
                    continue;
                }
            };

            let anti: Vec<f64> = others
                .iter()
                .filter_map(|(word, batch)| match model.score(batch) {
                    Ok(log_ll) => Some(log_ll),
                    Err(err) => {
                        debug!("{} model ({} states) could not score {}: {}", selector.word(), n_states, word, err);
                        None
                    }
                })
                .collect();

            let Some(score) = dic_score(target, &anti) else {
                debug!("{}: no other word scored with {} states", selector.word(), n_states);
                continue;
            };
            trace!("{}: n={} DIC={:.3}", selector.word(), n_states, score);
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
    use crate::test_support::{corpus_of, word_value, StubFitter};

    #[test]
    fn test_dic_formula() {
        assert_eq!(dic_score(10.0, &[2.0, 4.0]), Some(7.0));
        assert_eq!(dic_score(10.0, &[]), None);
    }

    #[test]
    fn test_target_gain_raises_score() {
        // other words score the same for every k, target peaks at k = 5
        let corpus = corpus_of(&[("A", 1.0, 3), ("B", 2.0, 3), ("C", 3.0, 3)]);
        let config = SelectorConfig::default();
        let fitter = StubFitter::new(|n, batch| {
            if word_value(batch) == 1.0 {
                Ok(if n == 5 { -10.0 } else { -20.0 })
            } else {
                Ok(-40.0)
            }
        });
        let selector = ModelSelector::new(&corpus, "A", &config, &fitter).unwrap();

        let model = SelectorDic.select(&selector).unwrap();
        assert_eq!(model.n_states(), 5);
    }

    #[test]
    fn test_rewards_discrimination() {
        // target likelihood is flat; k = 8 explains the other words worst
        let corpus = corpus_of(&[("A", 1.0, 3), ("B", 2.0, 3)]);
        let config = SelectorConfig::default();
        let fitter = StubFitter::new(|n, batch| {
            if word_value(batch) == 1.0 {
                Ok(-5.0)
            } else if n == 8 {
                Ok(-500.0)
            } else {
                Ok(-50.0)
            }
        });
        let selector = ModelSelector::new(&corpus, "A", &config, &fitter).unwrap();

        assert_eq!(SelectorDic.select(&selector).unwrap().n_states(), 8);
    }

    #[test]
    fn test_partial_other_word_failure() {
        // C never scores; B alone still gives DIC = -5 + n
        let corpus = corpus_of(&[("A", 1.0, 3), ("B", 2.0, 3), ("C", 3.0, 3)]);
        let config = SelectorConfig::default().with_range(2, 4);
        let fitter = StubFitter::new(|n, batch| match word_value(batch) {
            v if v == 1.0 => Ok(-5.0),
            v if v == 2.0 => Ok(-(n as f64)),
            _ => Err(ScoreError::NonFinite),
        });
        let selector = ModelSelector::new(&corpus, "A", &config, &fitter).unwrap();

        assert_eq!(SelectorDic.select(&selector).unwrap().n_states(), 4);
    }

    #[test]
    fn test_single_word_vocabulary_falls_back() {
        let corpus = corpus_of(&[("A", 1.0, 3)]);
        let config = SelectorConfig::default();
        let fitter = StubFitter::new(|n, _| Ok(n as f64));
        let selector = ModelSelector::new(&corpus, "A", &config, &fitter).unwrap();

        assert_eq!(SelectorDic.select(&selector).unwrap().n_states(), 3);
    }
}
