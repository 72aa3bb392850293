//! Synthetic sign corpora sampled from known word HMMs
//!
//! Each word is a left-to-right Gaussian HMM whose state means step away from
//! a per-word offset. Used by the `demo` command and the integration tests.

use crate::data::{SequenceCorpus, TestItem, TestSet};
use crate::error::{Error, Result};
use crate::models::{DiagonalGaussian, GaussianHMM, HMMParams};
use indexmap::IndexMap;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Ground truth for one vocabulary word
#[derive(Debug, Clone, PartialEq)]
pub struct WordSpec {
    pub word: String,
    pub n_states: usize,
    /// Mean of the first state in every feature
    pub offset: f64,
}

impl WordSpec {
    pub fn new(word: impl Into<String>, n_states: usize, offset: f64) -> Self {
        Self {
            word: word.into(),
            n_states,
            offset,
        }
    }
}

/// Seeded sampler of training corpora and test sets
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    n_features: usize,
    sequence_length: usize,
    /// Probability of staying in the current state
    stay_prob: f64,
    /// Distance between consecutive state means
    state_spacing: f64,
    variance: f64,
    rng: StdRng,
}

impl SyntheticGenerator {
    pub fn new(n_features: usize, sequence_length: usize, seed: u64) -> Self {
        Self {
            n_features,
            sequence_length,
            stay_prob: 0.75,
            state_spacing: 4.0,
            variance: 0.5,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_spacing(mut self, state_spacing: f64) -> Self {
        self.state_spacing = state_spacing;
        self
    }

    pub fn with_variance(mut self, variance: f64) -> Self {
        self.variance = variance;
        self
    }

    pub fn with_stay_prob(mut self, stay_prob: f64) -> Self {
        self.stay_prob = stay_prob;
        self
    }

    /// Left-to-right HMM for `spec`
    ///
    /// Odd features step downwards so that states differ in direction as
    /// well as distance.
    pub fn word_model(&self, spec: &WordSpec) -> Result<GaussianHMM> {
        let n = spec.n_states;
        if n == 0 {
            return Err(Error::invalid_input(format!("{}: word needs at least one state", spec.word)));
        }
        if !(0.0..1.0).contains(&self.stay_prob) {
            return Err(Error::invalid_input("stay probability must be in [0, 1)"));
        }

        let mut start_prob = Array1::zeros(n);
        start_prob[0] = 1.0;

        let mut transition_matrix = Array2::zeros((n, n));
        for i in 0..n - 1 {
            transition_matrix[[i, i]] = self.stay_prob;
            transition_matrix[[i, i + 1]] = 1.0 - self.stay_prob;
        }
        transition_matrix[[n - 1, n - 1]] = 1.0;

        let emissions = (0..n)
            .map(|state| {
                let mean = Array1::from_shape_fn(self.n_features, |j| {
                    let direction = if j % 2 == 0 { 1.0 } else { -1.0 };
                    spec.offset + direction * self.state_spacing * state as f64
                });
                DiagonalGaussian::new(mean, Array1::from_elem(self.n_features, self.variance))
            })
            .collect();

        GaussianHMM::from_params(HMMParams {
            start_prob,
            transition_matrix,
            emissions,
        })
    }

    /// `n_sequences` training sequences per word, in `specs` order
    pub fn corpus(&mut self, specs: &[WordSpec], n_sequences: usize) -> Result<SequenceCorpus> {
        let mut sequences = IndexMap::with_capacity(specs.len());
        for spec in specs {
            let model = self.word_model(spec)?;
            let samples = (0..n_sequences)
                .map(|_| model.sample(self.sequence_length, &mut self.rng).1)
                .collect();
            sequences.insert(spec.word.clone(), samples);
        }
        SequenceCorpus::new(sequences)
    }

    /// `n_per_word` test items per word, ids interleaved across words
    pub fn test_set(&mut self, specs: &[WordSpec], n_per_word: usize) -> Result<TestSet> {
        let models = specs
            .iter()
            .map(|spec| self.word_model(spec))
            .collect::<Result<Vec<_>>>()?;

        let mut items = Vec::with_capacity(specs.len() * n_per_word);
        for round in 0..n_per_word {
            for (idx, (spec, model)) in specs.iter().zip(&models).enumerate() {
                let (_, sequence) = model.sample(self.sequence_length, &mut self.rng);
                items.push(TestItem::new(round * specs.len() + idx, spec.word.clone(), sequence)?);
            }
        }
        TestSet::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SequenceBatch;
    use crate::models::SequenceModel;

    fn specs() -> Vec<WordSpec> {
        vec![WordSpec::new("JOHN", 3, 0.0), WordSpec::new("MARY", 2, 20.0)]
    }

    #[test]
    fn test_word_model_is_left_to_right() {
        let generator = SyntheticGenerator::new(2, 10, 1);
        let model = generator.word_model(&WordSpec::new("GO", 3, 1.0)).unwrap();

        assert_eq!(model.n_states(), 3);
        assert_eq!(model.n_features(), 2);
        let trans = model.transition_matrix();
        assert_eq!(trans[[0, 2]], 0.0);
        assert_eq!(trans[[2, 2]], 1.0);
        let means = model.emission_means();
        assert_eq!(means[1][0], 5.0);
        assert_eq!(means[1][1], -3.0);
    }

    #[test]
    fn test_variance_sets_emission_spread() {
        let generator = SyntheticGenerator::new(2, 10, 1).with_variance(2.0);
        let model = generator.word_model(&WordSpec::new("GO", 2, 0.0)).unwrap();
        let wide = SequenceBatch::from_sequences(&[ndarray::arr2(&[[1.5, 1.5]])]).unwrap();

        let narrow = SyntheticGenerator::new(2, 10, 1).with_variance(0.1);
        let narrow = narrow.word_model(&WordSpec::new("GO", 2, 0.0)).unwrap();
        assert!(model.score(&wide).unwrap() > narrow.score(&wide).unwrap());
    }

    #[test]
    fn test_zero_states_rejected() {
        let generator = SyntheticGenerator::new(2, 10, 1);
        assert!(generator.word_model(&WordSpec::new("GO", 0, 0.0)).is_err());
    }

    #[test]
    fn test_corpus_shape() {
        let corpus = SyntheticGenerator::new(3, 12, 7).corpus(&specs(), 4).unwrap();

        assert_eq!(corpus.words().collect::<Vec<_>>(), vec!["JOHN", "MARY"]);
        assert_eq!(corpus.n_features(), 3);
        let batch = corpus.batch("MARY").unwrap();
        assert_eq!(batch.n_sequences(), 4);
        assert_eq!(batch.n_frames(), 48);
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = SyntheticGenerator::new(2, 8, 99).corpus(&specs(), 2).unwrap();
        let b = SyntheticGenerator::new(2, 8, 99).corpus(&specs(), 2).unwrap();
        assert_eq!(a.batch("JOHN").unwrap().features(), b.batch("JOHN").unwrap().features());
    }

    #[test]
    fn test_test_set_ids_and_labels() {
        let test_set = SyntheticGenerator::new(2, 8, 3).test_set(&specs(), 2).unwrap();
        assert_eq!(test_set.len(), 4);
        assert_eq!(test_set.labels(), vec!["JOHN", "MARY", "JOHN", "MARY"]);
        assert_eq!(test_set.items()[3].id, 3);
    }
}
