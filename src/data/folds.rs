//! K-fold splitting over sequence indices

use super::batch::{Sequence, SequenceBatch};
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// One train/test partition of sequence indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// K-fold splitter
///
/// Without a shuffle seed the test blocks are contiguous and in order. When
/// `n` is not divisible by `n_splits`, the first `n % n_splits` folds get one
/// extra index.
#[derive(Debug, Clone)]
pub struct KFold {
    n_splits: usize,
    shuffle_seed: Option<u64>,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle_seed: None,
        }
    }

    /// Shuffle indices with the given seed before splitting
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Partition `0..n_samples` into `n_splits` folds
    pub fn split(&self, n_samples: usize) -> Result<Vec<Fold>> {
        if self.n_splits < 2 {
            return Err(Error::invalid_config(format!(
                "n_splits must be at least 2, got {}",
                self.n_splits
            )));
        }
        if self.n_splits > n_samples {
            return Err(Error::invalid_input(format!(
                "cannot split {} samples into {} folds",
                n_samples, self.n_splits
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if let Some(seed) = self.shuffle_seed {
            let mut rng = StdRng::seed_from_u64(seed);
            indices.shuffle(&mut rng);
        }

        let base = n_samples / self.n_splits;
        let extra = n_samples % self.n_splits;

        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for fold in 0..self.n_splits {
            let size = base + usize::from(fold < extra);
            let end = start + size;
            let test = indices[start..end].to_vec();
            let train = indices[..start]
                .iter()
                .chain(indices[end..].iter())
                .copied()
                .collect();
            folds.push(Fold { train, test });
            start = end;
        }

        Ok(folds)
    }
}

/// Concatenate the selected sequences into one batch
pub fn combine_sequences(indices: &[usize], sequences: &[Sequence]) -> Result<SequenceBatch> {
    let selected = indices
        .iter()
        .map(|&idx| {
            sequences.get(idx).cloned().ok_or_else(|| {
                Error::invalid_input(format!(
                    "sequence index {} out of range ({} sequences)",
                    idx,
                    sequences.len()
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    SequenceBatch::from_sequences(&selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_uneven_split() {
        let folds = KFold::new(3).split(7).unwrap();
        assert_eq!(folds.len(), 3);
        assert_eq!(folds[0].test, vec![0, 1, 2]);
        assert_eq!(folds[1].test, vec![3, 4]);
        assert_eq!(folds[2].test, vec![5, 6]);
        assert_eq!(folds[1].train, vec![0, 1, 2, 5, 6]);
    }

    #[test]
    fn test_every_index_tested_once() {
        let folds = KFold::new(4).with_shuffle(3).split(10).unwrap();
        let mut tested: Vec<usize> = folds.iter().flat_map(|f| f.test.clone()).collect();
        tested.sort_unstable();
        assert_eq!(tested, (0..10).collect::<Vec<_>>());
        for fold in &folds {
            assert_eq!(fold.train.len() + fold.test.len(), 10);
        }
    }

    #[test]
    fn test_too_many_folds() {
        assert!(KFold::new(3).split(2).is_err());
        assert!(KFold::new(1).split(5).is_err());
    }

    #[test]
    fn test_combine_sequences() {
        let sequences: Vec<Array2<f64>> = (0..3)
            .map(|i| Array2::from_elem((i + 1, 2), i as f64))
            .collect();
        let batch = combine_sequences(&[2, 0], &sequences).unwrap();
        assert_eq!(batch.lengths(), &[3, 1]);
        assert_eq!(batch.features()[[0, 0]], 2.0);
        assert_eq!(batch.features()[[3, 0]], 0.0);

        assert!(combine_sequences(&[5], &sequences).is_err());
    }
}
