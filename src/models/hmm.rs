//! Gaussian Hidden Markov Model with diagonal covariances

use super::algorithms::{forward, log_emissions, SufficientStats};
use super::fitter::{ModelFitter, SequenceModel};
use super::gaussian::DiagonalGaussian;
use crate::config::FitterConfig;
use crate::data::SequenceBatch;
use crate::error::{Error, FitError, ScoreError};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// HMM parameters
#[derive(Debug, Clone)]
pub struct HMMParams {
    /// Initial state probabilities
    pub start_prob: Array1<f64>,
    /// State transition matrix
    pub transition_matrix: Array2<f64>,
    /// Emission distributions (one per state)
    pub emissions: Vec<DiagonalGaussian>,
}

impl HMMParams {
    pub fn n_states(&self) -> usize {
        self.start_prob.len()
    }

    pub fn n_features(&self) -> usize {
        self.emissions.first().map_or(0, DiagonalGaussian::dim)
    }

    /// Check dimensions and that every distribution sums to one
    pub fn validate(&self) -> crate::error::Result<()> {
        let n = self.n_states();
        if n == 0 {
            return Err(Error::invalid_input("HMM needs at least one state"));
        }
        if self.transition_matrix.dim() != (n, n) || self.emissions.len() != n {
            return Err(Error::invalid_input(format!(
                "inconsistent dimensions for {} states",
                n
            )));
        }
        let d = self.n_features();
        if self.emissions.iter().any(|e| e.dim() != d || !e.is_valid()) {
            return Err(Error::invalid_input("emissions must share a dimension and have positive variances"));
        }
        let sums_to_one = |sum: f64| (sum - 1.0).abs() < 1e-6;
        if !sums_to_one(self.start_prob.sum())
            || !self.transition_matrix.rows().into_iter().all(|row| sums_to_one(row.sum()))
        {
            return Err(Error::invalid_input("probabilities must sum to 1"));
        }
        Ok(())
    }
}

/// Gaussian Hidden Markov Model
#[derive(Debug, Clone)]
pub struct GaussianHMM {
    params: HMMParams,
    /// Training log-likelihood per EM iteration
    log_likelihood_history: Vec<f64>,
    converged: bool,
}

impl GaussianHMM {
    /// Create a model from known parameters (e.g. to generate data)
    pub fn from_params(params: HMMParams) -> crate::error::Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            log_likelihood_history: vec![],
            converged: true,
        })
    }

    /// Get the transition matrix
    pub fn transition_matrix(&self) -> &Array2<f64> {
        &self.params.transition_matrix
    }

    /// Get emission means for each state
    pub fn emission_means(&self) -> Vec<Array1<f64>> {
        self.params.emissions.iter().map(|e| e.mean.clone()).collect()
    }

    pub fn log_likelihood_history(&self) -> &[f64] {
        &self.log_likelihood_history
    }

    /// Whether EM stopped on tolerance rather than the iteration cap
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Sample a state path and observation sequence
    pub fn sample<R: Rng>(&self, length: usize, rng: &mut R) -> (Vec<usize>, Array2<f64>) {
        let mut states = Vec::with_capacity(length);
        let mut observations = Array2::zeros((length, self.params.n_features()));

        let mut current = sample_discrete(self.params.start_prob.iter().copied(), rng);
        for t in 0..length {
            if t > 0 {
                let row = self.params.transition_matrix.row(current);
                current = sample_discrete(row.iter().copied(), rng);
            }
            states.push(current);
            let obs = self.params.emissions[current].sample(rng);
            observations.row_mut(t).assign(&obs);
        }

        (states, observations)
    }
}

impl SequenceModel for GaussianHMM {
    fn n_states(&self) -> usize {
        self.params.n_states()
    }

    fn n_features(&self) -> usize {
        self.params.n_features()
    }

    fn score(&self, batch: &SequenceBatch) -> Result<f64, ScoreError> {
        if batch.n_features() != self.n_features() {
            return Err(ScoreError::DimensionMismatch {
                expected: self.n_features(),
                found: batch.n_features(),
            });
        }
        if batch.n_sequences() == 0 {
            return Err(ScoreError::Empty);
        }

        let log_start = self.params.start_prob.mapv(f64::ln);
        let log_trans = self.params.transition_matrix.mapv(f64::ln);

        let log_ll: f64 = batch
            .sequences()
            .map(|seq| {
                let log_emit = log_emissions(seq, &self.params.emissions);
                forward(&log_start, &log_trans, &log_emit).1
            })
            .sum();

        if log_ll.is_finite() {
            Ok(log_ll)
        } else {
            Err(ScoreError::NonFinite)
        }
    }
}

/// Baum-Welch trainer for [`GaussianHMM`]
#[derive(Debug, Clone)]
pub struct GaussianHmmFitter {
    /// Convergence tolerance on the log-likelihood gain
    pub tol: f64,
    /// Floor added to every variance
    pub min_covar: f64,
}

impl Default for GaussianHmmFitter {
    fn default() -> Self {
        Self::from(&FitterConfig::default())
    }
}

impl From<&FitterConfig> for GaussianHmmFitter {
    fn from(config: &FitterConfig) -> Self {
        Self {
            tol: config.tol,
            min_covar: config.min_covar,
        }
    }
}

impl ModelFitter for GaussianHmmFitter {
    type Model = GaussianHMM;

    fn fit(
        &self,
        batch: &SequenceBatch,
        n_states: usize,
        seed: u64,
        max_iter: usize,
    ) -> Result<GaussianHMM, FitError> {
        if n_states == 0 {
            return Err(FitError::InvalidStateCount(n_states));
        }
        let observations = batch.features();
        if observations.nrows() < n_states {
            return Err(FitError::InsufficientData {
                frames: observations.nrows(),
                n_states,
            });
        }
        if observations.iter().any(|v| !v.is_finite()) {
            return Err(FitError::Data("observations contain non-finite values".into()));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut params = self.initial_params(observations, n_states, &mut rng);

        let mut history = Vec::new();
        let mut converged = false;
        let mut prev_ll = f64::NEG_INFINITY;

        for iter in 0..max_iter {
            let log_start = params.start_prob.mapv(f64::ln);
            let log_trans = params.transition_matrix.mapv(f64::ln);

            let mut stats = SufficientStats::new(n_states, batch.n_features());
            for seq in batch.sequences() {
                stats.accumulate(seq, &log_start, &log_trans, &params.emissions);
            }

            let log_ll = stats.log_likelihood;
            if !log_ll.is_finite() {
                return Err(FitError::NonFinite { iteration: iter });
            }
            history.push(log_ll);

            self.maximize(&mut params, &stats)?;

            if iter > 0 && log_ll - prev_ll < self.tol {
                tracing::trace!("Converged after {} iterations", iter + 1);
                converged = true;
                break;
            }
            prev_ll = log_ll;
        }

        Ok(GaussianHMM {
            params,
            log_likelihood_history: history,
            converged,
        })
    }
}

impl GaussianHmmFitter {
    /// Uniform start/transition, k-means means, global variance
    fn initial_params<R: Rng>(&self, observations: &Array2<f64>, n_states: usize, rng: &mut R) -> HMMParams {
        let variance = observations.var_axis(Axis(0), 0.0) + self.min_covar;
        let emissions = kmeans_centers(observations, n_states, rng)
            .into_iter()
            .map(|mean| DiagonalGaussian::new(mean, variance.clone()))
            .collect();

        HMMParams {
            start_prob: Array1::from_elem(n_states, 1.0 / n_states as f64),
            transition_matrix: Array2::from_elem((n_states, n_states), 1.0 / n_states as f64),
            emissions,
        }
    }

    /// M-step; states without posterior mass keep their previous parameters
    fn maximize(&self, params: &mut HMMParams, stats: &SufficientStats) -> Result<(), FitError> {
        let start_sum = stats.start.sum();
        if start_sum > 1e-300 {
            params.start_prob = &stats.start / start_sum;
        }

        for (i, counts) in stats.trans.rows().into_iter().enumerate() {
            let row_sum = counts.sum();
            if row_sum > 1e-300 {
                params
                    .transition_matrix
                    .row_mut(i)
                    .assign(&(&counts / row_sum));
            }
        }

        for (j, emission) in params.emissions.iter_mut().enumerate() {
            let post = stats.post[j];
            if post < 1e-10 {
                continue;
            }
            let mean = &stats.obs.row(j) / post;
            let variance = (&stats.obs_sq.row(j) / post - mean.mapv(|m| m * m))
                .mapv(|v| v.max(0.0))
                + self.min_covar;

            let updated = DiagonalGaussian::new(mean, variance);
            if !updated.is_valid() {
                return Err(FitError::Degenerate { state: j });
            }
            *emission = updated;
        }

        Ok(())
    }
}

/// Simple k-means on rows, seeded from distinct random rows
fn kmeans_centers<R: Rng>(observations: &Array2<f64>, k: usize, rng: &mut R) -> Vec<Array1<f64>> {
    let n = observations.nrows();
    let mut centers: Vec<Array1<f64>> = rand::seq::index::sample(rng, n, k)
        .into_iter()
        .map(|idx| observations.row(idx).to_owned())
        .collect();

    let mut assignments = vec![0; n];
    for _ in 0..10 {
        for (i, row) in observations.rows().into_iter().enumerate() {
            let mut best_dist = f64::MAX;
            for (j, center) in centers.iter().enumerate() {
                let dist: f64 = row
                    .iter()
                    .zip(center.iter())
                    .map(|(a, b)| (a - b).powi(2))
                    .sum();
                if dist < best_dist {
                    best_dist = dist;
                    assignments[i] = j;
                }
            }
        }

        for (j, center) in centers.iter_mut().enumerate() {
            let mut sum = Array1::zeros(observations.ncols());
            let mut count = 0;
            for (i, row) in observations.rows().into_iter().enumerate() {
                if assignments[i] == j {
                    sum += &row;
                    count += 1;
                }
            }
            if count > 0 {
                *center = sum / count as f64;
            }
        }
    }

    centers
}

/// Sample from discrete distribution
fn sample_discrete<R: Rng>(probs: impl Iterator<Item = f64>, rng: &mut R) -> usize {
    let u: f64 = rng.gen();
    let mut cumsum = 0.0;
    let mut last = 0;
    for (i, p) in probs.enumerate() {
        cumsum += p;
        last = i;
        if u < cumsum {
            return i;
        }
    }
    last
}
