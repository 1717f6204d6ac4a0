//! Domain models: the parsed poem and the result objects each analysis action returns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::util::{is_line_break, strip_punct};

/// A poem split into lines. Lines hold only poem characters (punctuation and
/// whitespace removed); `text` keeps the input as given.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poem {
  text: String,
  lines: Vec<String>,
}

impl Poem {
  /// Split on newlines and sentence punctuation; empty segments are dropped.
  pub fn parse(text: &str) -> Self {
    let lines = text
      .split(is_line_break)
      .map(strip_punct)
      .filter(|l| !l.is_empty())
      .collect();
    Self { text: text.to_string(), lines }
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  /// Character count of every line.
  pub fn line_lengths(&self) -> Vec<usize> {
    self.lines.iter().map(|l| l.chars().count()).collect()
  }

  /// Last character of every line (lines are never empty).
  pub fn line_endings(&self) -> Vec<char> {
    self.lines.iter().filter_map(|l| l.chars().last()).collect()
  }

  /// All poem characters, lines concatenated.
  pub fn joined(&self) -> String {
    self.lines.concat()
  }
}

/// Output of the theme classifier. Labels are always names, never indices.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Classification {
  pub label: String,
  pub probabilities: BTreeMap<String, f64>,
}

/// One of the four scoring metrics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricScore {
  pub name: String,
  pub score: f64,
  pub max: f64,
  pub analysis: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl MetricScore {
  pub fn ok(name: &str, score: f64, max: f64, analysis: String) -> Self {
    Self { name: name.to_string(), score, max, analysis, error: None }
  }

  /// A metric that could not be computed: zero points plus the reason.
  pub fn failed(name: &str, max: f64, error: String) -> Self {
    Self {
      name: name.to_string(),
      score: 0.0,
      max,
      analysis: format!("计算失败：{}", error),
      error: Some(error),
    }
  }
}

/// Aggregated quality report. `total` is the exact sum of the four metrics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoreReport {
  pub imagery: MetricScore,
  pub theme: MetricScore,
  pub rhyme: MetricScore,
  pub structure: MetricScore,
  pub total: f64,
}

impl ScoreReport {
  pub fn new(imagery: MetricScore, theme: MetricScore, rhyme: MetricScore, structure: MetricScore) -> Self {
    let total = imagery.score + theme.score + rhyme.score + structure.score;
    Self { imagery, theme, rhyme, structure, total }
  }

  pub fn metrics(&self) -> [&MetricScore; 4] {
    [&self.imagery, &self.theme, &self.rhyme, &self.structure]
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageryEmotion {
  pub word: String,
  pub emotion: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
  pub emotion: String,
  pub score: f64,
}

/// Emotion analysis result; `scores` is ranked, highest first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmotionResult {
  pub primary: String,
  pub secondary: Option<String>,
  pub imagery: Vec<ImageryEmotion>,
  pub scores: Vec<EmotionScore>,
  pub analysis: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gloss {
  pub word: String,
  pub meaning: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Explained {
  pub name: String,
  pub explanation: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranslationResult {
  pub original: String,
  pub translation: String,
  pub theme: Option<Explained>,
  pub rhetoric: Option<Explained>,
  pub imagery: Vec<Gloss>,
  pub explanation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
  pub word: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gloss: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub emotions: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub imagery_kind: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnnotationResult {
  pub highlighted: String,
  pub annotations: Vec<Annotation>,
  pub pinyin: String,
}
