//! Sequence data module
//!
//! Provides the training corpus, test set, flattened batches and k-fold splitting.

mod batch;
mod corpus;
mod folds;

pub use batch::{Sequence, SequenceBatch};
pub use corpus::{SequenceCorpus, TestItem, TestSet};
pub use folds::{combine_sequences, Fold, KFold};
