//! Diagonal-covariance Gaussian distribution for HMM emissions

use ndarray::{Array1, ArrayView1};
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;

/// Gaussian with independent feature dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalGaussian {
    /// Mean vector
    pub mean: Array1<f64>,
    /// Per-dimension variances
    pub variance: Array1<f64>,
    /// Cached `-0.5 * (d * ln(2*pi) + sum(ln(variance)))`
    log_norm: f64,
}

impl DiagonalGaussian {
    /// Create new Gaussian; variances must be positive
    pub fn new(mean: Array1<f64>, variance: Array1<f64>) -> Self {
        let mut gaussian = Self {
            mean,
            variance,
            log_norm: 0.0,
        };
        gaussian.update_cache();
        gaussian
    }

    /// Unit variance in every dimension
    pub fn with_unit_variance(mean: Array1<f64>) -> Self {
        let variance = Array1::ones(mean.len());
        Self::new(mean, variance)
    }

    /// Dimension of the distribution
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Whether all variances are finite and strictly positive
    pub fn is_valid(&self) -> bool {
        self.variance.iter().all(|v| v.is_finite() && *v > 0.0)
            && self.mean.iter().all(|m| m.is_finite())
    }

    fn update_cache(&mut self) {
        let d = self.dim() as f64;
        let log_det: f64 = self.variance.iter().map(|v| v.ln()).sum();
        self.log_norm = -0.5 * (d * (2.0 * PI).ln() + log_det);
    }

    /// Log probability density at a point
    pub fn log_pdf(&self, x: ArrayView1<f64>) -> f64 {
        let quad_form: f64 = x
            .iter()
            .zip(self.mean.iter())
            .zip(self.variance.iter())
            .map(|((xi, mi), vi)| (xi - mi).powi(2) / vi)
            .sum();
        self.log_norm - 0.5 * quad_form
    }

    /// Draw one observation
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Array1<f64> {
        let mut result = self.mean.clone();
        for (value, var) in result.iter_mut().zip(self.variance.iter()) {
            let z: f64 = rng.sample(StandardNormal);
            *value += var.sqrt() * z;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_log_pdf_standard_normal() {
        let g = DiagonalGaussian::with_unit_variance(array![0.0]);
        let expected = -0.5 * (2.0 * PI).ln();
        assert!((g.log_pdf(array![0.0].view()) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_pdf_highest_at_mean() {
        let g = DiagonalGaussian::new(array![1.0, -1.0], array![0.5, 2.0]);
        let at_mean = g.log_pdf(array![1.0, -1.0].view());
        let away = g.log_pdf(array![2.0, 0.0].view());
        assert!(at_mean > away);
    }

    #[test]
    fn test_sample_mean() {
        let g = DiagonalGaussian::new(array![3.0, -2.0], array![0.25, 0.25]);
        let mut rng = StdRng::seed_from_u64(7);
        let n = 2000;
        let mut sum = Array1::zeros(2);
        for _ in 0..n {
            sum += &g.sample(&mut rng);
        }
        let mean = sum / n as f64;
        assert!((mean[0] - 3.0).abs() < 0.1);
        assert!((mean[1] + 2.0).abs() < 0.1);
    }

    #[test]
    fn test_sample_spread_follows_variance() {
        let g = DiagonalGaussian::new(array![0.0], array![4.0]);
        let mut rng = StdRng::seed_from_u64(11);
        let n = 4000;
        let samples: Vec<f64> = (0..n).map(|_| g.sample(&mut rng)[0]).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((var - 4.0).abs() < 0.4, "variance {}", var);
    }

    #[test]
    fn test_invalid_variance() {
        let g = DiagonalGaussian::new(array![0.0], array![0.0]);
        assert!(!g.is_valid());
    }
}
