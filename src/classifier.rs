//! Theme classifier: TF-IDF features and a calibrated one-vs-rest linear SVM.
//!
//! Training fits on a seeded 80/20 split of the corpus, evaluates on the
//! held-out part and writes `vectorizer.json` / `classifier.json` to the
//! model directory. Inference loads those artifacts lazily, once, and shares
//! the fitted model between callers.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, RwLock};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::ClassifierConfig;
use crate::corpus::{load_corpus, LabeledPoem};
use crate::domain::Classification;
use crate::error::{AnalysisError, Result};
use crate::svm::{argmax, OneVsRestSvm, SvmParams};
use crate::tfidf::TfidfVectorizer;
use crate::tokenizer::Tokenizer;

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";

/// Fewest usable rows that still leave one training and one test poem.
const MIN_ROWS: usize = 2;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ClassifierArtifact {
  labels: Vec<String>,
  model: OneVsRestSvm,
}

/// A fitted vectorizer + SVM pair with its label names.
#[derive(Clone, Debug)]
pub struct FittedModel {
  labels: Vec<String>,
  vectorizer: TfidfVectorizer,
  svm: OneVsRestSvm,
}

impl FittedModel {
  pub fn labels(&self) -> &[String] {
    &self.labels
  }

  pub fn vocabulary_size(&self) -> usize {
    self.vectorizer.vocabulary_size()
  }

  pub fn classify_tokens(&self, tokens: &[String]) -> Classification {
    let x = self.vectorizer.transform(tokens);
    let proba = self.svm.predict_proba(&x);
    let label = self.labels.get(argmax(&proba)).cloned().unwrap_or_default();
    let probabilities = self.labels.iter().cloned().zip(proba).collect();
    Classification { label, probabilities }
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct LabelMetrics {
  pub label: String,
  pub precision: f64,
  pub recall: f64,
  pub f1: f64,
  pub support: usize,
}

/// Held-out evaluation of a training run.
#[derive(Clone, Debug, Serialize)]
pub struct ClassificationReport {
  pub per_label: Vec<LabelMetrics>,
  pub accuracy: f64,
  pub train_size: usize,
  pub test_size: usize,
  pub vocabulary_size: usize,
}

impl ClassificationReport {
  fn evaluate(labels: &[String], truth: &[usize], predicted: &[usize]) -> (Vec<LabelMetrics>, f64) {
    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let per_label = labels
      .iter()
      .enumerate()
      .map(|(k, label)| {
        let tp = truth.iter().zip(predicted).filter(|(t, p)| **t == k && **p == k).count();
        let predicted_k = predicted.iter().filter(|p| **p == k).count();
        let support = truth.iter().filter(|t| **t == k).count();
        let precision = ratio(tp, predicted_k);
        let recall = ratio(tp, support);
        let f1 = if precision + recall > 0.0 { 2.0 * precision * recall / (precision + recall) } else { 0.0 };
        LabelMetrics { label: label.clone(), precision, recall, f1, support }
      })
      .collect();
    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    (per_label, ratio(correct, truth.len()))
  }
}

impl fmt::Display for ClassificationReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{:>10} {:>10} {:>10} {:>10} {:>10}", "label", "precision", "recall", "f1-score", "support")?;
    for m in &self.per_label {
      writeln!(f, "{:>10} {:>10.2} {:>10.2} {:>10.2} {:>10}", m.label, m.precision, m.recall, m.f1, m.support)?;
    }
    writeln!(f, "{:>10} {:>32.2} {:>10}", "accuracy", self.accuracy, self.test_size)?;
    write!(f, "train={} test={} vocabulary={}", self.train_size, self.test_size, self.vocabulary_size)
  }
}

pub struct PoemClassifier {
  config: ClassifierConfig,
  tokenizer: Arc<Tokenizer>,
  model: RwLock<Option<Arc<FittedModel>>>,
}

impl PoemClassifier {
  pub fn new(config: ClassifierConfig, tokenizer: Arc<Tokenizer>) -> Self {
    Self { config, tokenizer, model: RwLock::new(None) }
  }

  pub fn labels(&self) -> &[String] {
    &self.config.labels
  }

  /// Train from the configured corpus file and persist the artifacts.
  pub fn train_from_config(&self) -> Result<ClassificationReport> {
    let path = self.config.corpus_path.clone();
    self.train_from_path(&path)
  }

  #[instrument(level = "info", skip(self), fields(path = %path.display()))]
  pub fn train_from_path(&self, path: &Path) -> Result<ClassificationReport> {
    let rows = load_corpus(path)?;
    let report = self.train(&rows)?;
    self.save()?;
    Ok(report)
  }

  /// Fit on `rows` and keep the model in memory. Nothing is written to disk.
  #[instrument(level = "info", skip(self, rows), fields(rows = rows.len()))]
  pub fn train(&self, rows: &[LabeledPoem]) -> Result<ClassificationReport> {
    let labels = &self.config.labels;
    let mut unknown: BTreeMap<&str, usize> = BTreeMap::new();
    let mut data: Vec<(Vec<String>, usize)> = Vec::with_capacity(rows.len());
    for row in rows {
      match labels.iter().position(|l| *l == row.label) {
        Some(k) => data.push((self.tokenizer.tokenize(&row.content), k)),
        None => *unknown.entry(row.label.as_str()).or_insert(0) += 1,
      }
    }
    for (label, count) in &unknown {
      warn!(target: "classifier", %label, count, "Skipping corpus rows with a label outside the label set");
    }

    let n = data.len();
    if n < MIN_ROWS {
      return Err(AnalysisError::CorpusTooSmall { rows: n, required: MIN_ROWS });
    }

    let mut rng = StdRng::seed_from_u64(self.config.seed);
    data.shuffle(&mut rng);
    let fraction = self.config.test_fraction.clamp(0.0, 1.0);
    // tolerance for binary rounding, e.g. 15 * 0.2
    let test_size = ((n as f64) * fraction - 1e-9).ceil().max(0.0) as usize;
    let train_size = n.saturating_sub(test_size);
    if train_size == 0 {
      return Err(AnalysisError::CorpusTooSmall { rows: n, required: MIN_ROWS });
    }
    let (train, test) = data.split_at(train_size);

    let train_docs: Vec<Vec<String>> = train.iter().map(|(t, _)| t.clone()).collect();
    let train_classes: Vec<usize> = train.iter().map(|(_, k)| *k).collect();
    let vectorizer = TfidfVectorizer::fit(&train_docs);
    let xs: Vec<_> = train_docs.iter().map(|d| vectorizer.transform(d)).collect();
    let params = SvmParams { epochs: self.config.epochs, lambda: self.config.lambda, seed: self.config.seed };
    let svm = OneVsRestSvm::fit(&xs, &train_classes, labels.len(), vectorizer.vocabulary_size(), &params);

    let truth: Vec<usize> = test.iter().map(|(_, k)| *k).collect();
    let predicted: Vec<usize> = test.iter().map(|(t, _)| svm.predict(&vectorizer.transform(t))).collect();
    let (per_label, accuracy) = ClassificationReport::evaluate(labels, &truth, &predicted);
    if test.is_empty() {
      warn!(target: "classifier", "Test split is empty; evaluation figures are zero");
    }

    let report = ClassificationReport {
      per_label,
      accuracy,
      train_size,
      test_size: test.len(),
      vocabulary_size: vectorizer.vocabulary_size(),
    };
    info!(
      target: "classifier",
      train = report.train_size,
      test = report.test_size,
      vocabulary = report.vocabulary_size,
      accuracy = %format!("{:.3}", report.accuracy),
      "Classifier trained"
    );

    let fitted = FittedModel { labels: labels.clone(), vectorizer, svm };
    *self.model.write().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(fitted));
    Ok(report)
  }

  /// Write the in-memory model to the model directory.
  pub fn save(&self) -> Result<()> {
    let model = self.current().ok_or_else(|| AnalysisError::ModelNotTrained(self.config.model_dir.clone()))?;
    let dir = &self.config.model_dir;
    std::fs::create_dir_all(dir)
      .map_err(|e| AnalysisError::ModelPersist { path: dir.clone(), reason: e.to_string() })?;
    write_json(&dir.join(VECTORIZER_FILE), &model.vectorizer)?;
    write_json(
      &dir.join(CLASSIFIER_FILE),
      &ClassifierArtifact { labels: model.labels.clone(), model: model.svm.clone() },
    )?;
    info!(target: "classifier", dir = %dir.display(), "Model artifacts saved");
    Ok(())
  }

  fn current(&self) -> Option<Arc<FittedModel>> {
    self.model.read().unwrap_or_else(|e| e.into_inner()).clone()
  }

  /// The fitted model, loading it from disk on first use.
  pub fn model(&self) -> Result<Arc<FittedModel>> {
    if let Some(m) = self.current() {
      return Ok(m);
    }
    let mut slot = self.model.write().unwrap_or_else(|e| e.into_inner());
    if let Some(m) = slot.as_ref() {
      return Ok(m.clone());
    }
    let loaded = Arc::new(self.load_from_disk()?);
    *slot = Some(loaded.clone());
    Ok(loaded)
  }

  pub fn is_trained(&self) -> bool {
    self.current().is_some()
  }

  fn load_from_disk(&self) -> Result<FittedModel> {
    let dir = &self.config.model_dir;
    let vec_path = dir.join(VECTORIZER_FILE);
    let clf_path = dir.join(CLASSIFIER_FILE);
    if !vec_path.exists() || !clf_path.exists() {
      return Err(AnalysisError::ModelNotTrained(dir.clone()));
    }
    let vectorizer: TfidfVectorizer = read_json(&vec_path)?;
    let artifact: ClassifierArtifact = read_json(&clf_path)?;
    if artifact.labels.len() != artifact.model.n_classes() {
      return Err(AnalysisError::ModelPersist {
        path: clf_path,
        reason: format!("{} labels for {} classes", artifact.labels.len(), artifact.model.n_classes()),
      });
    }
    if artifact.labels != self.config.labels {
      warn!(target: "classifier", saved = ?artifact.labels, configured = ?self.config.labels, "Saved model labels differ from configuration; using saved labels");
    }
    info!(target: "classifier", dir = %dir.display(), vocabulary = vectorizer.vocabulary_size(), "Model artifacts loaded");
    Ok(FittedModel { labels: artifact.labels, vectorizer, svm: artifact.model })
  }

  #[instrument(level = "info", skip(self, text), fields(text_len = text.len()))]
  pub fn predict(&self, text: &str) -> Result<Classification> {
    let model = self.model()?;
    Ok(model.classify_tokens(&self.tokenizer.tokenize(text)))
  }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
  let persist = |reason: String| AnalysisError::ModelPersist { path: path.to_path_buf(), reason };
  let body = serde_json::to_string(value).map_err(|e| persist(e.to_string()))?;
  std::fs::write(path, body).map_err(|e| persist(e.to_string()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
  let persist = |reason: String| AnalysisError::ModelPersist { path: path.to_path_buf(), reason };
  let body = std::fs::read_to_string(path).map_err(|e| persist(e.to_string()))?;
  serde_json::from_str(&body).map_err(|e| persist(e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn evaluation_counts_precision_and_recall() {
    let labels = vec!["a".to_string(), "b".to_string()];
    let (per_label, acc) = ClassificationReport::evaluate(&labels, &[0, 0, 1, 1], &[0, 1, 1, 1]);
    assert_eq!(acc, 0.75);
    assert_eq!(per_label[0].precision, 1.0);
    assert_eq!(per_label[0].recall, 0.5);
    assert!((per_label[1].precision - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(per_label[1].support, 2);
  }

  #[test]
  fn untrained_classifier_reports_a_precondition_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ClassifierConfig { model_dir: dir.path().join("none"), ..ClassifierConfig::default() };
    let clf = PoemClassifier::new(cfg, Arc::new(Tokenizer::default()));
    assert!(matches!(clf.predict("床前明月光"), Err(AnalysisError::ModelNotTrained(_))));
    assert!(!clf.is_trained());
  }

  #[test]
  fn a_single_usable_row_is_too_small() {
    let clf = PoemClassifier::new(ClassifierConfig::default(), Arc::new(Tokenizer::default()));
    let rows = vec![
      LabeledPoem { content: "床前明月光".into(), label: "山水".into() },
      LabeledPoem { content: "大漠孤烟直".into(), label: "边塞".into() },
    ];
    assert!(matches!(clf.train(&rows), Err(AnalysisError::CorpusTooSmall { rows: 1, .. })));
  }
}
