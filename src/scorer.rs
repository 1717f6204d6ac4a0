//! Four-metric poem quality scorer (100 points in total).
//!
//! | metric     | max | basis                                          |
//! |------------|-----|------------------------------------------------|
//! | 意境表达力 | 40  | imagery word occurrences, action bonus         |
//! | 主题相关性 | 25  | mean cosine of adjacent line embeddings        |
//! | 韵律感     | 20  | rhyme class of the rhyme-bearing line endings  |
//! | 对仗结构   | 15  | equal line lengths, equal token counts (1, 2)  |
//!
//! A metric that cannot be computed scores 0 and carries its error; the
//! report itself is always produced.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::domain::{MetricScore, Poem, ScoreReport};
use crate::error::{AnalysisError, Result};
use crate::lexicon::{ImageryKind, Lexicon, Tag};
use crate::model::{cosine_similarity, ModelService};
use crate::pinyin::rhyme_class;
use crate::tokenizer::Tokenizer;

pub const IMAGERY: (&str, f64) = ("意境表达力", 40.0);
pub const THEME: (&str, f64) = ("主题相关性", 25.0);
pub const RHYME: (&str, f64) = ("韵律感", 20.0);
pub const STRUCTURE: (&str, f64) = ("对仗结构", 15.0);

const POINTS_PER_IMAGE: f64 = 2.5;
const IMAGERY_BASE_CAP: f64 = 30.0;
const ACTION_BONUS: f64 = 10.0;
const FULL_RHYME: f64 = 20.0;
const PARTIAL_RHYME: f64 = 5.0;
const EQUAL_LENGTH_BONUS: f64 = 8.0;
const PARALLEL_BONUS: f64 = 7.0;
const MIN_LINES: usize = 2;

pub struct PoemScorer {
  lexicon: Arc<Lexicon>,
  tokenizer: Arc<Tokenizer>,
  model: Arc<dyn ModelService>,
}

fn require_lines(poem: &Poem) -> Result<()> {
  let found = poem.lines().len();
  if found < MIN_LINES {
    return Err(AnalysisError::InsufficientLines { found, required: MIN_LINES });
  }
  Ok(())
}

/// Lines whose endings must rhyme: the even lines of a poem with four or more
/// lines, every line of a shorter one.
pub fn rhyme_bearing_endings(poem: &Poem) -> Vec<char> {
  let endings = poem.line_endings();
  if endings.len() >= 4 {
    endings.into_iter().skip(1).step_by(2).collect()
  } else {
    endings
  }
}

impl PoemScorer {
  pub fn new(lexicon: Arc<Lexicon>, tokenizer: Arc<Tokenizer>, model: Arc<dyn ModelService>) -> Self {
    Self { lexicon, tokenizer, model }
  }

  pub fn imagery_score(&self, poem: &Poem) -> MetricScore {
    let mut count = 0usize;
    let mut has_action = false;
    for line in poem.lines() {
      for hit in self.lexicon.hits(line) {
        // a word listed under two kinds counts once per kind
        for tag in &hit.tags {
          if let Tag::Imagery(kind) = tag {
            count += 1;
            has_action |= *kind == ImageryKind::Action;
          }
        }
      }
    }
    let base = (count as f64 * POINTS_PER_IMAGE).min(IMAGERY_BASE_CAP);
    let bonus = if has_action { ACTION_BONUS } else { 0.0 };
    let score = (base + bonus).min(IMAGERY.1);
    MetricScore::ok(
      IMAGERY.0,
      score,
      IMAGERY.1,
      format!("意象词数量：{}，动作描写：{}", count, if has_action { "有" } else { "无" }),
    )
  }

  pub fn theme_score(&self, poem: &Poem) -> Result<MetricScore> {
    require_lines(poem)?;
    let embeddings = poem
      .lines()
      .iter()
      .map(|l| self.model.embed(l))
      .collect::<std::result::Result<Vec<_>, _>>()?;
    let sims: Vec<f64> = embeddings.windows(2).map(|w| cosine_similarity(&w[0], &w[1])).collect();
    let mean = sims.iter().sum::<f64>() / sims.len() as f64;
    let score = (mean * THEME.1).clamp(0.0, THEME.1);
    Ok(MetricScore::ok(THEME.0, score, THEME.1, format!("句子相似度：{:.2}", mean)))
  }

  pub fn rhyme_score(&self, poem: &Poem) -> Result<MetricScore> {
    require_lines(poem)?;
    let classes: Vec<Option<String>> = rhyme_bearing_endings(poem).into_iter().map(rhyme_class).collect();
    let rhymed = classes.first().is_some_and(|c| c.is_some()) && classes.windows(2).all(|w| w[0] == w[1]);
    debug!(target: "scoring", ?classes, rhymed, "Rhyme classes");
    Ok(if rhymed {
      MetricScore::ok(RHYME.0, FULL_RHYME, RHYME.1, "完全押韵".into())
    } else {
      MetricScore::ok(RHYME.0, PARTIAL_RHYME, RHYME.1, "不完全押韵".into())
    })
  }

  pub fn structure_score(&self, poem: &Poem) -> Result<MetricScore> {
    require_lines(poem)?;
    let mut score = 0.0;
    let mut notes = Vec::new();

    let lengths = poem.line_lengths();
    if lengths.windows(2).all(|w| w[0] == w[1]) {
      score += EQUAL_LENGTH_BONUS;
      notes.push("字数整齐");
    }
    let lines = poem.lines();
    if self.tokenizer.tokenize(&lines[0]).len() == self.tokenizer.tokenize(&lines[1]).len() {
      score += PARALLEL_BONUS;
      notes.push("有对仗倾向");
    }

    let analysis = if notes.is_empty() { "无对仗结构".to_string() } else { notes.join("、") };
    Ok(MetricScore::ok(STRUCTURE.0, score, STRUCTURE.1, analysis))
  }

  /// Score all four metrics. Never fails: broken metrics degrade to 0.
  #[instrument(level = "info", skip(self, text), fields(text_len = text.len()))]
  pub fn score(&self, text: &str) -> ScoreReport {
    let poem = Poem::parse(text);
    let degrade = |metric: (&str, f64), r: Result<MetricScore>| {
      r.unwrap_or_else(|e| {
        warn!(target: "scoring", metric = metric.0, error = %e, "Metric failed; scoring 0");
        MetricScore::failed(metric.0, metric.1, e.to_string())
      })
    };

    let report = ScoreReport::new(
      self.imagery_score(&poem),
      degrade(THEME, self.theme_score(&poem)),
      degrade(RHYME, self.rhyme_score(&poem)),
      degrade(STRUCTURE, self.structure_score(&poem)),
    );
    debug!(target: "scoring", total = report.total, lines = poem.lines().len(), "Poem scored");
    report
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::LocalModel;

  fn scorer() -> PoemScorer {
    let lexicon = Arc::new(Lexicon::builtin());
    let tokenizer = Arc::new(Tokenizer::from_lexicon(&lexicon));
    PoemScorer::new(lexicon, tokenizer, Arc::new(LocalModel::new()))
  }

  #[test]
  fn imagery_counts_occurrences_and_action_bonus() {
    let s = scorer();
    let m = s.imagery_score(&Poem::parse("千山鸟飞绝，万径人踪灭。"));
    // 山 鸟 飞 -> 3 hits, 飞 is an action word
    assert_eq!(m.score, 3.0 * 2.5 + 10.0);
    assert!(m.analysis.contains("有"));
  }

  #[test]
  fn imagery_never_exceeds_forty() {
    let m = scorer().imagery_score(&Poem::parse("风云山雨雪月日星天地，花草树竹梅兰菊松柏柳飞舞"));
    assert_eq!(m.score, 40.0);
  }

  #[test]
  fn imagery_base_caps_at_thirty_without_action() {
    let m = scorer().imagery_score(&Poem::parse("风云山雨雪月日星天地，花草树竹梅兰菊松柏柳"));
    // 20 hits, none of them an action word
    assert_eq!(m.score, 30.0);
    assert!(m.analysis.contains("意象词数量：20"));
    assert!(m.analysis.ends_with("无"));
  }

  #[test]
  fn imagery_counts_a_word_once_per_kind() {
    let lexicon = Arc::new(
      Lexicon::empty()
        .with_imagery(ImageryKind::Nature, &["风"])
        .with_imagery(ImageryKind::Action, &["风"]),
    );
    let tokenizer = Arc::new(Tokenizer::from_lexicon(&lexicon));
    let s = PoemScorer::new(lexicon, tokenizer, Arc::new(LocalModel::new()));
    let m = s.imagery_score(&Poem::parse("风起，风停"));
    assert_eq!(m.score, 4.0 * 2.5 + 10.0);
  }

  #[test]
  fn rhyme_bearing_lines_are_the_even_ones() {
    let poem = Poem::parse("春眠不觉晓，处处闻啼鸟。夜来风雨声，花落知多少。");
    assert_eq!(rhyme_bearing_endings(&poem), vec!['鸟', '少']);
    let short = Poem::parse("白日依山尽，黄河入海流。");
    assert_eq!(rhyme_bearing_endings(&short), vec!['尽', '流']);
  }

  #[test]
  fn single_line_degrades_three_metrics() {
    let r = scorer().score("床前明月光");
    assert!(r.theme.error.is_some());
    assert!(r.rhyme.error.is_some());
    assert!(r.structure.error.is_some());
    assert_eq!(r.total, r.imagery.score);
  }
}
