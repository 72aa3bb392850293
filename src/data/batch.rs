//! Flattened sequence batches

use crate::error::{Error, Result};
use ndarray::{concatenate, s, Array2, ArrayView2, Axis};

/// One observation sequence (rows = frames, cols = features)
pub type Sequence = Array2<f64>;

/// Several sequences stacked into one feature matrix plus per-sequence lengths
///
/// The lengths always sum to the number of rows of the feature matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceBatch {
    features: Array2<f64>,
    lengths: Vec<usize>,
}

impl SequenceBatch {
    /// Create a batch, checking that the lengths cover the feature matrix
    pub fn new(features: Array2<f64>, lengths: Vec<usize>) -> Result<Self> {
        let total: usize = lengths.iter().sum();
        if total != features.nrows() {
            return Err(Error::invalid_input(format!(
                "lengths sum to {} but feature matrix has {} rows",
                total,
                features.nrows()
            )));
        }
        if lengths.iter().any(|&len| len == 0) {
            return Err(Error::invalid_input("sequence lengths must be positive"));
        }
        Ok(Self { features, lengths })
    }

    /// Stack sequences in order
    pub fn from_sequences(sequences: &[Sequence]) -> Result<Self> {
        if sequences.is_empty() {
            return Err(Error::invalid_input("cannot build a batch from zero sequences"));
        }
        let views: Vec<ArrayView2<f64>> = sequences.iter().map(|seq| seq.view()).collect();
        let features = concatenate(Axis(0), &views)?;
        let lengths = sequences.iter().map(|seq| seq.nrows()).collect();
        Self::new(features, lengths)
    }

    /// Concatenated feature matrix
    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    /// Per-sequence frame counts
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Number of sequences
    pub fn n_sequences(&self) -> usize {
        self.lengths.len()
    }

    /// Total number of frames
    pub fn n_frames(&self) -> usize {
        self.features.nrows()
    }

    /// Feature dimensionality
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Iterate over the individual sequences as views
    pub fn sequences(&self) -> impl Iterator<Item = ArrayView2<'_, f64>> + '_ {
        let mut start = 0;
        self.lengths.iter().map(move |&len| {
            let view = self.features.slice(s![start..start + len, ..]);
            start += len;
            view
        })
    }
}
