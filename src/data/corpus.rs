//! Training corpus and test set containers
//!
//! Both load from a long-format CSV: `word,sequence,frame,<features...>`,
//! one row per frame. In a training file `sequence` numbers the repetitions
//! of a word; in a test file it is the test item id.

use super::batch::{Sequence, SequenceBatch};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use ndarray::Array2;
use std::collections::BTreeMap;
use std::path::Path;

/// Per-word training sequences plus their flattened batches
#[derive(Debug, Clone)]
pub struct SequenceCorpus {
    sequences: IndexMap<String, Vec<Sequence>>,
    batches: IndexMap<String, SequenceBatch>,
    n_features: usize,
}

impl SequenceCorpus {
    /// Build a corpus; every word needs at least one sequence and all
    /// sequences must share the same feature width.
    pub fn new(sequences: IndexMap<String, Vec<Sequence>>) -> Result<Self> {
        let n_features = check_width(sequences.values().flatten())?;

        let mut batches = IndexMap::with_capacity(sequences.len());
        for (word, seqs) in &sequences {
            if seqs.is_empty() {
                return Err(Error::invalid_input(format!("word '{}' has no sequences", word)));
            }
            batches.insert(word.clone(), SequenceBatch::from_sequences(seqs)?);
        }

        Ok(Self {
            sequences,
            batches,
            n_features,
        })
    }

    /// Load from CSV
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table = FrameTable::read(path)?;

        let mut grouped: IndexMap<String, BTreeMap<usize, Vec<FrameRow>>> = IndexMap::new();
        for row in table.rows {
            grouped
                .entry(row.word.clone())
                .or_default()
                .entry(row.sequence)
                .or_default()
                .push(row);
        }

        let mut sequences = IndexMap::with_capacity(grouped.len());
        for (word, by_sequence) in grouped {
            let seqs = by_sequence
                .into_values()
                .map(|rows| rows_to_sequence(rows, table.n_features))
                .collect::<Result<Vec<_>>>()?;
            sequences.insert(word, seqs);
        }

        Self::new(sequences)
    }

    /// Save to CSV
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = FrameWriter::create(path, self.n_features)?;
        for (word, seqs) in &self.sequences {
            for (idx, seq) in seqs.iter().enumerate() {
                writer.write_sequence(word, idx, seq)?;
            }
        }
        writer.finish()
    }

    /// Vocabulary in insertion order
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.sequences.keys().map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.sequences.contains_key(word)
    }

    /// Training sequences for a word
    pub fn sequences(&self, word: &str) -> Option<&[Sequence]> {
        self.sequences.get(word).map(Vec::as_slice)
    }

    /// Flattened batch for a word
    pub fn batch(&self, word: &str) -> Option<&SequenceBatch> {
        self.batches.get(word)
    }

    /// All flattened batches in vocabulary order
    pub fn batches(&self) -> impl Iterator<Item = (&str, &SequenceBatch)> {
        self.batches.iter().map(|(word, batch)| (word.as_str(), batch))
    }

    /// Number of words
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

/// One unknown sequence to recognise, with its true label
#[derive(Debug, Clone)]
pub struct TestItem {
    pub id: usize,
    pub word: String,
    pub batch: SequenceBatch,
}

impl TestItem {
    pub fn new(id: usize, word: impl Into<String>, sequence: Sequence) -> Result<Self> {
        Ok(Self {
            id,
            word: word.into(),
            batch: SequenceBatch::from_sequences(std::slice::from_ref(&sequence))?,
        })
    }
}

/// Test items ordered by id
#[derive(Debug, Clone, Default)]
pub struct TestSet {
    items: Vec<TestItem>,
}

impl TestSet {
    /// Build a test set; items are sorted by id and ids must be unique
    pub fn new(mut items: Vec<TestItem>) -> Result<Self> {
        check_width(items.iter().map(|item| item.batch.features()))?;
        items.sort_by_key(|item| item.id);
        if let Some(pair) = items.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(Error::invalid_input(format!("duplicate test item id {}", pair[0].id)));
        }
        Ok(Self { items })
    }

    /// Load from CSV
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table = FrameTable::read(path)?;

        let mut grouped: BTreeMap<usize, Vec<FrameRow>> = BTreeMap::new();
        for row in table.rows {
            grouped.entry(row.sequence).or_default().push(row);
        }

        let mut items = Vec::with_capacity(grouped.len());
        for (id, rows) in grouped {
            let word = rows[0].word.clone();
            if rows.iter().any(|row| row.word != word) {
                return Err(Error::parse(format!("test item {} has more than one label", id)));
            }
            let sequence = rows_to_sequence(rows, table.n_features)?;
            items.push(TestItem::new(id, word, sequence)?);
        }

        Self::new(items)
    }

    /// Save to CSV
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let n_features = self.items.first().map_or(0, |item| item.batch.n_features());
        let mut writer = FrameWriter::create(path, n_features)?;
        for item in &self.items {
            writer.write_sequence(&item.word, item.id, item.batch.features())?;
        }
        writer.finish()
    }

    /// Items in ascending id order
    pub fn items(&self) -> &[TestItem] {
        &self.items
    }

    /// True labels in item order
    pub fn labels(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.word.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn check_width<'a>(sequences: impl Iterator<Item = &'a Sequence>) -> Result<usize> {
    let mut width = None;
    for seq in sequences {
        match width {
            None => width = Some(seq.ncols()),
            Some(w) if w != seq.ncols() => {
                return Err(Error::invalid_input(format!(
                    "inconsistent feature width: {} vs {}",
                    w,
                    seq.ncols()
                )));
            }
            Some(_) => {}
        }
    }
    Ok(width.unwrap_or(0))
}

struct FrameRow {
    word: String,
    sequence: usize,
    frame: usize,
    values: Vec<f64>,
}

struct FrameTable {
    n_features: usize,
    rows: Vec<FrameRow>,
}

impl FrameTable {
    fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers = reader.headers()?.clone();
        if headers.len() < 4 {
            return Err(Error::parse(
                "expected header 'word,sequence,frame' followed by at least one feature column",
            ));
        }
        let n_features = headers.len() - 3;

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |pos| pos.line());
            if record.len() != headers.len() {
                return Err(Error::parse(format!(
                    "line {}: expected {} fields, found {}",
                    line,
                    headers.len(),
                    record.len()
                )));
            }

            let sequence = parse_field::<usize>(&record[1], "sequence", line)?;
            let frame = parse_field::<usize>(&record[2], "frame", line)?;
            let values = (3..record.len())
                .map(|idx| parse_field::<f64>(&record[idx], &headers[idx], line))
                .collect::<Result<Vec<_>>>()?;

            rows.push(FrameRow {
                word: record[0].to_string(),
                sequence,
                frame,
                values,
            });
        }

        Ok(Self { n_features, rows })
    }
}

fn parse_field<T: std::str::FromStr>(value: &str, column: &str, line: u64) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::parse(format!("line {}: bad value '{}' in column '{}'", line, value, column)))
}

/// Frames of one sequence in order; frame numbers must be exactly `0..n`
fn rows_to_sequence(mut rows: Vec<FrameRow>, n_features: usize) -> Result<Sequence> {
    rows.sort_by_key(|row| row.frame);
    if let Some((expected, row)) = rows.iter().enumerate().find(|(idx, row)| row.frame != *idx) {
        return Err(Error::parse(format!(
            "word '{}' sequence {}: expected frame {}, found {}",
            row.word, row.sequence, expected, row.frame
        )));
    }
    let n_frames = rows.len();
    let flat: Vec<f64> = rows.into_iter().flat_map(|row| row.values).collect();
    Ok(Array2::from_shape_vec((n_frames, n_features), flat)?)
}

struct FrameWriter {
    writer: csv::Writer<std::fs::File>,
}

impl FrameWriter {
    fn create<P: AsRef<Path>>(path: P, n_features: usize) -> Result<Self> {
        let mut writer = csv::Writer::from_path(path)?;
        let mut header = vec!["word".to_string(), "sequence".to_string(), "frame".to_string()];
        header.extend((0..n_features).map(|idx| format!("f{}", idx)));
        writer.write_record(&header)?;
        Ok(Self { writer })
    }

    fn write_sequence(&mut self, word: &str, sequence: usize, features: &Array2<f64>) -> Result<()> {
        for (frame, row) in features.rows().into_iter().enumerate() {
            let mut record = vec![word.to_string(), sequence.to_string(), frame.to_string()];
            record.extend(row.iter().map(|value| value.to_string()));
            self.writer.write_record(&record)?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
