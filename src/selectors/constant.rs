//! Baseline selector: always the configured constant state count

use super::base::{ModelSelector, SelectionStrategy};
use crate::models::ModelFitter;

/// Fits `n_constant` states, no search
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorConstant;

impl<F: ModelFitter> SelectionStrategy<F> for SelectorConstant {
    fn select(&self, selector: &ModelSelector<'_, F>) -> Option<F::Model> {
        selector.base_model(selector.config().n_constant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;
    use crate::models::SequenceModel;
    use crate::test_support::{corpus_of, StubFitter};

    #[test]
    fn test_returns_constant_states() {
        let corpus = corpus_of(&[("FISH", 1.0, 3)]);
        let config = SelectorConfig::default().with_constant(4);
        let fitter = StubFitter::new(|_, _| Ok(-1.0));
        let selector = ModelSelector::new(&corpus, "FISH", &config, &fitter).unwrap();

        let model = SelectorConstant.select(&selector).unwrap();
        assert_eq!(model.n_states(), 4);
        assert_eq!(fitter.fits(), vec![(4, 9)]);
    }

    #[test]
    fn test_failure_is_none() {
        let corpus = corpus_of(&[("FISH", 1.0, 3)]);
        let config = SelectorConfig::default();
        let fitter = StubFitter::new(|_, _| Ok(-1.0)).failing_on(&[3]);
        let selector = ModelSelector::new(&corpus, "FISH", &config, &fitter).unwrap();

        assert!(SelectorConstant.select(&selector).is_none());
    }
}
