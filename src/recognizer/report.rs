//! Word error rate summary of a recognition run

use super::RecognitionOutput;
use crate::data::TestSet;
use colored::Colorize;

/// One misrecognised test item
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub item_id: usize,
    pub truth: String,
    pub guess: Option<String>,
}

/// Recognition results compared against the test labels
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionReport {
    pub total: usize,
    pub mismatches: Vec<Mismatch>,
}

impl RecognitionReport {
    pub fn new(output: &RecognitionOutput, test_set: &TestSet) -> Self {
        let mismatches = output
            .item_ids
            .iter()
            .zip(&output.guesses)
            .zip(test_set.labels())
            .filter(|((_, guess), truth)| guess.as_deref() != Some(*truth))
            .map(|((&item_id, guess), truth)| Mismatch {
                item_id,
                truth: truth.to_string(),
                guess: guess.clone(),
            })
            .collect();

        Self {
            total: output.len(),
            mismatches,
        }
    }

    pub fn correct(&self) -> usize {
        self.total - self.mismatches.len()
    }

    pub fn word_error_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.mismatches.len() as f64 / self.total as f64
        }
    }

    /// Print the mismatch table followed by the WER
    pub fn print(&self) {
        println!("{}", "=== Recognition Report ===".bold());

        if self.mismatches.is_empty() {
            println!("{}", "All test items recognised.".green());
        } else {
            println!("{:>6}  {:<16} {:<16}", "ID", "TRUTH", "GUESS");
            for mismatch in &self.mismatches {
                let guess = match &mismatch.guess {
                    Some(word) => word.as_str().red(),
                    None => "<unknown>".yellow(),
                };
                println!("{:>6}  {:<16} {:<16}", mismatch.item_id, mismatch.truth, guess);
            }
        }

        let wer = self.word_error_rate();
        let wer_str = format!("{:.2}%", wer * 100.0);
        let wer_str = if wer < 0.4 {
            wer_str.green()
        } else if wer < 0.6 {
            wer_str.yellow()
        } else {
            wer_str.red()
        };

        println!();
        println!("Correct: {} / {}", self.correct(), self.total);
        println!("WER: {}", wer_str);
    }
}

impl RecognitionOutput {
    /// Build the report for this output
    pub fn report(&self, test_set: &TestSet) -> RecognitionReport {
        RecognitionReport::new(self, test_set)
    }

    pub fn print_report(&self, test_set: &TestSet) {
        self.report(test_set).print();
    }
}
