//! TF-IDF vectorizer over pre-tokenized documents.
//!
//! Weights follow the usual smoothed scheme: raw term counts times
//! `ln((1 + n) / (1 + df)) + 1`, then L2 normalisation. The vocabulary is the
//! sorted set of training tokens, so indices are stable across runs.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Sparse vector as `(index, value)` pairs sorted by index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
  entries: Vec<(usize, f64)>,
}

impl SparseVector {
  pub fn from_map(map: BTreeMap<usize, f64>) -> Self {
    Self { entries: map.into_iter().filter(|(_, v)| *v != 0.0).collect() }
  }

  pub fn entries(&self) -> &[(usize, f64)] {
    &self.entries
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn norm(&self) -> f64 {
    self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
  }

  /// Dot product with a dense weight vector; out-of-range indices count as 0.
  pub fn dot(&self, dense: &[f64]) -> f64 {
    self
      .entries
      .iter()
      .filter_map(|(i, v)| dense.get(*i).map(|w| w * v))
      .sum()
  }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TfidfVectorizer {
  vocabulary: BTreeMap<String, usize>,
  idf: Vec<f64>,
}

impl TfidfVectorizer {
  /// Learn vocabulary and idf weights from tokenized documents.
  pub fn fit(documents: &[Vec<String>]) -> Self {
    let terms: BTreeSet<&str> = documents.iter().flatten().map(String::as_str).collect();
    let vocabulary: BTreeMap<String, usize> = terms
      .into_iter()
      .enumerate()
      .map(|(i, t)| (t.to_string(), i))
      .collect();

    let mut doc_freq = vec![0usize; vocabulary.len()];
    for doc in documents {
      let unique: BTreeSet<usize> = doc.iter().filter_map(|t| vocabulary.get(t).copied()).collect();
      for idx in unique {
        doc_freq[idx] += 1;
      }
    }

    let n = documents.len() as f64;
    let idf = doc_freq
      .iter()
      .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
      .collect();

    Self { vocabulary, idf }
  }

  pub fn vocabulary_size(&self) -> usize {
    self.vocabulary.len()
  }

  pub fn index_of(&self, term: &str) -> Option<usize> {
    self.vocabulary.get(term).copied()
  }

  pub fn idf(&self, term: &str) -> Option<f64> {
    self.index_of(term).and_then(|i| self.idf.get(i).copied())
  }

  /// Vectorize one document; tokens outside the fitted vocabulary are ignored.
  pub fn transform(&self, tokens: &[String]) -> SparseVector {
    let mut counts: HashMap<usize, f64> = HashMap::new();
    for t in tokens {
      if let Some(&idx) = self.vocabulary.get(t) {
        *counts.entry(idx).or_insert(0.0) += 1.0;
      }
    }

    let mut weights: BTreeMap<usize, f64> = counts
      .into_iter()
      .map(|(idx, tf)| (idx, tf * self.idf[idx]))
      .collect();

    let norm = weights.values().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
      for v in weights.values_mut() {
        *v /= norm;
      }
    }

    SparseVector::from_map(weights)
  }
}
