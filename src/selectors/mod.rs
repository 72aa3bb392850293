//! Model selection strategies
//!
//! Each strategy searches the configured state-count interval for one word and
//! returns the best fitted model, or a fallback fit when every candidate fails.

mod base;
mod bic;
mod constant;
mod cv;
mod dic;

pub use base::{ModelSelector, SelectionStrategy};
pub use bic::{bic_score, parameter_count, SelectorBic};
pub use constant::SelectorConstant;
pub use cv::SelectorCv;
pub use dic::{dic_score, SelectorDic};

use crate::config::SelectorConfig;
use crate::data::SequenceCorpus;
use crate::error::Result;
use crate::models::{ModelFitter, SequenceModel};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Selection strategy choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Fixed state count
    Constant,
    /// Bayesian Information Criterion
    #[default]
    Bic,
    /// Discriminative Information Criterion
    Dic,
    /// Cross-validated likelihood
    Cv,
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Constant => "constant",
            StrategyKind::Bic => "BIC",
            StrategyKind::Dic => "DIC",
            StrategyKind::Cv => "CV",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl<F: ModelFitter> SelectionStrategy<F> for StrategyKind {
    fn select(&self, selector: &ModelSelector<'_, F>) -> Option<F::Model> {
        match self {
            StrategyKind::Constant => SelectorConstant.select(selector),
            StrategyKind::Bic => SelectorBic.select(selector),
            StrategyKind::Dic => SelectorDic.select(selector),
            StrategyKind::Cv => SelectorCv.select(selector),
        }
    }
}

/// Run a strategy over every vocabulary word, in corpus order
///
/// Words whose selection failed entirely map to `None`. Only an invalid
/// configuration is reported as an error.
pub fn train_all_words<F, S>(
    corpus: &SequenceCorpus,
    strategy: &S,
    config: &SelectorConfig,
    fitter: &F,
) -> Result<IndexMap<String, Option<F::Model>>>
where
    F: ModelFitter,
    S: SelectionStrategy<F> + ?Sized,
{
    config.validate()?;

    let mut models = IndexMap::with_capacity(corpus.len());
    for word in corpus.words() {
        let selector = ModelSelector::new(corpus, word, config, fitter)?;
        let model = strategy.select(&selector);
        match &model {
            Some(model) => info!("{}: selected {} states", word, model.n_states()),
            None => warn!("{}: no model could be trained", word),
        }
        models.insert(word.to_string(), model);
    }

    Ok(models)
}
