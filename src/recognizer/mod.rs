//! Recognition of test items against per-word models
//!
//! Every test item is scored by every available word model. Models that fail
//! to score an item are left out of that item's table. When no model can
//! score an item its guess is `None`.

mod report;

pub use report::{Mismatch, RecognitionReport};

use crate::data::TestSet;
use crate::models::SequenceModel;
use indexmap::IndexMap;
use tracing::{debug, warn};

/// Log-likelihood of one test item under each word model
pub type ScoreTable = IndexMap<String, f64>;

/// Score tables and guesses, parallel to the test items in id order
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionOutput {
    /// Test item ids
    pub item_ids: Vec<usize>,
    /// Per-item scores
    pub probabilities: Vec<ScoreTable>,
    /// Best-scoring word per item, `None` if nothing could score it
    pub guesses: Vec<Option<String>>,
}

impl RecognitionOutput {
    pub fn len(&self) -> usize {
        self.guesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guesses.is_empty()
    }

    /// Fraction of items whose guess differs from the label (unknown counts as wrong)
    pub fn word_error_rate(&self, test_set: &TestSet) -> f64 {
        if self.guesses.is_empty() {
            return 0.0;
        }
        let errors = self
            .guesses
            .iter()
            .zip(test_set.labels())
            .filter(|(guess, label)| guess.as_deref() != Some(*label))
            .count();
        errors as f64 / self.guesses.len() as f64
    }
}

/// First word with the strictly highest score
pub fn best_guess(table: &ScoreTable) -> Option<&str> {
    let mut best: Option<(&str, f64)> = None;
    for (word, &score) in table {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((word.as_str(), score)),
        }
    }
    best.map(|(word, _)| word)
}

/// Score every test item against every word model
///
/// Words mapped to `None` (selection failed) are treated like models that
/// cannot score anything.
pub fn recognize<M: SequenceModel>(
    models: &IndexMap<String, Option<M>>,
    test_set: &TestSet,
) -> RecognitionOutput {
    let mut output = RecognitionOutput {
        item_ids: Vec::with_capacity(test_set.len()),
        probabilities: Vec::with_capacity(test_set.len()),
        guesses: Vec::with_capacity(test_set.len()),
    };

    for item in test_set.items() {
        let mut table = ScoreTable::with_capacity(models.len());
        for (word, model) in models {
            let Some(model) = model else {
                continue;
            };
            match model.score(&item.batch) {
                Ok(log_ll) if log_ll.is_finite() => {
                    table.insert(word.clone(), log_ll);
                }
                Ok(_) => debug!("item {}: {} model gave a non-finite score", item.id, word),
                Err(err) => debug!("item {}: {} model failed: {}", item.id, word, err),
            }
        }

        let guess = best_guess(&table).map(str::to_string);
        if guess.is_none() {
            warn!("item {}: no word model could score it", item.id);
        }

        output.item_ids.push(item.id);
        output.probabilities.push(table);
        output.guesses.push(guess);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TestItem;
    use crate::error::ScoreError;
    use crate::test_support::{word_value, StubModel};
    use ndarray::Array2;

    fn test_set(values: &[(usize, &str, f64)]) -> TestSet {
        let items = values
            .iter()
            .map(|&(id, word, value)| TestItem::new(id, word, Array2::from_elem((4, 2), value)).unwrap())
            .collect();
        TestSet::new(items).unwrap()
    }

    /// Model that scores best on frames close to `center`
    fn centered(center: f64) -> StubModel {
        StubModel::new(3, move |_, batch| Ok(-(word_value(batch) - center).abs()))
    }

    #[test]
    fn test_best_guess_first_max_wins() {
        let mut table = ScoreTable::new();
        table.insert("A".into(), -3.0);
        table.insert("B".into(), -1.0);
        table.insert("C".into(), -1.0);
        assert_eq!(best_guess(&table), Some("B"));
        assert_eq!(best_guess(&ScoreTable::new()), None);
    }

    #[test]
    fn test_recognize_picks_closest_model() {
        let mut models = IndexMap::new();
        models.insert("JOHN".to_string(), Some(centered(1.0)));
        models.insert("MARY".to_string(), Some(centered(5.0)));

        let tests = test_set(&[(3, "MARY", 4.8), (1, "JOHN", 1.1)]);
        let output = recognize(&models, &tests);

        assert_eq!(output.item_ids, vec![1, 3]);
        assert_eq!(
            output.guesses,
            vec![Some("JOHN".to_string()), Some("MARY".to_string())]
        );
        assert_eq!(output.probabilities[0].len(), 2);
        assert_eq!(output.word_error_rate(&tests), 0.0);
    }

    #[test]
    fn test_failing_models_omitted() {
        let mut models = IndexMap::new();
        models.insert("JOHN".to_string(), Some(centered(1.0)));
        models.insert(
            "BROKEN".to_string(),
            Some(StubModel::new(2, |_, _| Err(ScoreError::NonFinite))),
        );
        models.insert("NONE".to_string(), None);

        let output = recognize(&models, &test_set(&[(0, "JOHN", 1.0)]));
        assert_eq!(output.probabilities[0].keys().collect::<Vec<_>>(), vec!["JOHN"]);
        assert_eq!(output.guesses[0].as_deref(), Some("JOHN"));
    }

    #[test]
    fn test_unscorable_item_gets_no_guess() {
        let mut models = IndexMap::new();
        models.insert(
            "JOHN".to_string(),
            Some(StubModel::new(2, |_, batch| {
                if word_value(batch) > 100.0 {
                    Err(ScoreError::NonFinite)
                } else {
                    Ok(-1.0)
                }
            })),
        );

        let tests = test_set(&[(0, "JOHN", 1.0), (1, "JOHN", 500.0)]);
        let output = recognize(&models, &tests);

        assert_eq!(output.len(), 2);
        assert!(output.probabilities[1].is_empty());
        assert_eq!(output.guesses[1], None);
        assert_eq!(output.word_error_rate(&tests), 0.5);
    }

    #[test]
    fn test_recognition_is_repeatable() {
        let mut models = IndexMap::new();
        models.insert("A".to_string(), Some(centered(0.0)));
        models.insert("B".to_string(), Some(centered(2.0)));
        let tests = test_set(&[(0, "A", 0.2), (1, "B", 1.9), (2, "A", 1.0)]);

        assert_eq!(recognize(&models, &tests), recognize(&models, &tests));
    }
}
