//! HMM models module
//!
//! Provides the fitting/scoring traits the selectors depend on and a
//! diagonal-covariance Gaussian HMM trained with Baum-Welch.

mod algorithms;
mod fitter;
mod gaussian;
mod hmm;

pub use algorithms::{backward, forward, log_emissions, log_sum_exp, SufficientStats};
pub use fitter::{ModelFitter, SequenceModel};
pub use gaussian::DiagonalGaussian;
pub use hmm::{GaussianHMM, GaussianHmmFitter, HMMParams};
