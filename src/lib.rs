//! # ASL Recognizer
//!
//! Hidden Markov Model topology selection and isolated-sign recognition.
//!
//! Every vocabulary word gets its own Gaussian HMM. The number of hidden
//! states per word is chosen by one of four strategies, then unseen sequences
//! are labelled with the word whose model gives them the highest
//! log-likelihood.
//!
//! ## Features
//!
//! - **Data**: per-word training corpora, test sets, CSV loading and k-fold splitting
//! - **Models**: diagonal Gaussian HMM trained with multi-sequence Baum-Welch
//! - **Selectors**: constant, BIC, DIC and cross-validated state-count selection
//! - **Recognizer**: per-item score tables, best guesses and word error rate
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use asl_recognizer::{
//!     recognize, train_all_words, GaussianHmmFitter, SelectorConfig, SequenceCorpus,
//!     StrategyKind, TestSet,
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     let corpus = SequenceCorpus::from_csv("train.csv")?;
//!     let test_set = TestSet::from_csv("test.csv")?;
//!
//!     let config = SelectorConfig::default();
//!     let fitter = GaussianHmmFitter::default();
//!     let models = train_all_words(&corpus, &StrategyKind::Bic, &config, &fitter)?;
//!
//!     let output = recognize(&models, &test_set);
//!     output.print_report(&test_set);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod recognizer;
pub mod selectors;
pub mod synthetic;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use config::{Config, FitterConfig, FoldAveraging, SelectorConfig};
pub use data::{KFold, SequenceBatch, SequenceCorpus, TestItem, TestSet};
pub use error::{Error, FitError, Result, ScoreError};
pub use models::{GaussianHMM, GaussianHmmFitter, ModelFitter, SequenceModel};
pub use recognizer::{recognize, RecognitionOutput, RecognitionReport, ScoreTable};
pub use selectors::{
    train_all_words, ModelSelector, SelectionStrategy, SelectorBic, SelectorConstant, SelectorCv,
    SelectorDic, StrategyKind,
};
pub use synthetic::{SyntheticGenerator, WordSpec};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
