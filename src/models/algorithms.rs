//! HMM algorithms in log space: forward, backward and Baum-Welch statistics

use super::gaussian::DiagonalGaussian;
use ndarray::{Array1, Array2, ArrayView2};

/// Numerically stable `log(sum(exp(xs)))`
///
/// Returns negative infinity for an empty slice or when every entry is
/// negative infinity.
pub fn log_sum_exp(xs: &[f64]) -> f64 {
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    let sum: f64 = xs.iter().map(|&x| (x - max).exp()).sum();
    max + sum.ln()
}

/// Log emission densities for every frame and state (T x N)
pub fn log_emissions(observations: ArrayView2<f64>, emissions: &[DiagonalGaussian]) -> Array2<f64> {
    let t = observations.nrows();
    let n = emissions.len();
    let mut log_emit = Array2::zeros((t, n));
    for (t_idx, obs) in observations.rows().into_iter().enumerate() {
        for (j, emission) in emissions.iter().enumerate() {
            log_emit[[t_idx, j]] = emission.log_pdf(obs);
        }
    }
    log_emit
}

/// Forward pass
///
/// # Returns
/// (log alpha (T x N), log P(observations | model))
pub fn forward(
    log_start: &Array1<f64>,
    log_trans: &Array2<f64>,
    log_emit: &Array2<f64>,
) -> (Array2<f64>, f64) {
    let t = log_emit.nrows();
    let n = log_start.len();
    let mut alpha = Array2::from_elem((t, n), f64::NEG_INFINITY);

    if t == 0 {
        return (alpha, 0.0);
    }

    for j in 0..n {
        alpha[[0, j]] = log_start[j] + log_emit[[0, j]];
    }

    let mut buf = vec![0.0; n];
    for t_idx in 1..t {
        for j in 0..n {
            for i in 0..n {
                buf[i] = alpha[[t_idx - 1, i]] + log_trans[[i, j]];
            }
            alpha[[t_idx, j]] = log_sum_exp(&buf) + log_emit[[t_idx, j]];
        }
    }

    let last: Vec<f64> = alpha.row(t - 1).to_vec();
    let log_likelihood = log_sum_exp(&last);
    (alpha, log_likelihood)
}

/// Backward pass, returns log beta (T x N)
pub fn backward(log_trans: &Array2<f64>, log_emit: &Array2<f64>) -> Array2<f64> {
    let t = log_emit.nrows();
    let n = log_emit.ncols();
    let mut beta = Array2::zeros((t, n));

    if t < 2 {
        return beta;
    }

    let mut buf = vec![0.0; n];
    for t_idx in (0..t - 1).rev() {
        for i in 0..n {
            for j in 0..n {
                buf[j] = log_trans[[i, j]] + log_emit[[t_idx + 1, j]] + beta[[t_idx + 1, j]];
            }
            beta[[t_idx, i]] = log_sum_exp(&buf);
        }
    }

    beta
}

/// Expected counts accumulated over one or more sequences (E-step)
#[derive(Debug, Clone)]
pub struct SufficientStats {
    /// Posterior mass of each state at t = 0
    pub start: Array1<f64>,
    /// Expected transition counts (N x N)
    pub trans: Array2<f64>,
    /// Total posterior mass per state
    pub post: Array1<f64>,
    /// Posterior-weighted observation sums (N x D)
    pub obs: Array2<f64>,
    /// Posterior-weighted squared observation sums (N x D)
    pub obs_sq: Array2<f64>,
    /// Sum of per-sequence log-likelihoods
    pub log_likelihood: f64,
}

impl SufficientStats {
    pub fn new(n_states: usize, n_features: usize) -> Self {
        Self {
            start: Array1::zeros(n_states),
            trans: Array2::zeros((n_states, n_states)),
            post: Array1::zeros(n_states),
            obs: Array2::zeros((n_states, n_features)),
            obs_sq: Array2::zeros((n_states, n_features)),
            log_likelihood: 0.0,
        }
    }

    /// Add the statistics of a single sequence
    ///
    /// A sequence with non-finite likelihood only poisons `log_likelihood`;
    /// the caller is expected to check it before the M-step.
    pub fn accumulate(
        &mut self,
        observations: ArrayView2<f64>,
        log_start: &Array1<f64>,
        log_trans: &Array2<f64>,
        emissions: &[DiagonalGaussian],
    ) {
        let t = observations.nrows();
        let n = emissions.len();

        let log_emit = log_emissions(observations, emissions);
        let (alpha, log_ll) = forward(log_start, log_trans, &log_emit);
        self.log_likelihood += log_ll;
        if !log_ll.is_finite() || t == 0 {
            return;
        }
        let beta = backward(log_trans, &log_emit);

        for (t_idx, obs) in observations.rows().into_iter().enumerate() {
            let obs_sq = obs.mapv(|v| v * v);
            for j in 0..n {
                let gamma = (alpha[[t_idx, j]] + beta[[t_idx, j]] - log_ll).exp();
                if t_idx == 0 {
                    self.start[j] += gamma;
                }
                self.post[j] += gamma;
                self.obs.row_mut(j).scaled_add(gamma, &obs);
                self.obs_sq.row_mut(j).scaled_add(gamma, &obs_sq);
            }
        }

        for t_idx in 0..t - 1 {
            for i in 0..n {
                for j in 0..n {
                    self.trans[[i, j]] += (alpha[[t_idx, i]]
                        + log_trans[[i, j]]
                        + log_emit[[t_idx + 1, j]]
                        + beta[[t_idx + 1, j]]
                        - log_ll)
                        .exp();
                }
            }
        }
    }
}
