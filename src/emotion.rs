//! Emotion and imagery analysis.
//!
//! Each emotion category scores `0.6 * share of imagery hits + 0.4 * cosine
//! similarity` between the poem embedding and the embedding of the category's
//! keywords and imagery words. The top two categories become the primary and
//! secondary emotions.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::{EmotionResult, EmotionScore, ImageryEmotion};
use crate::error::Result;
use crate::lexicon::Lexicon;
use crate::model::{cosine_similarity, ModelService};
use crate::tokenizer::Tokenizer;
use crate::util::trunc_for_log;

const IMAGERY_WEIGHT: f64 = 0.6;
const SEMANTIC_WEIGHT: f64 = 0.4;

pub const UNKNOWN_EMOTION: &str = "unknown";

pub struct EmotionAnalyzer {
  lexicon: Arc<Lexicon>,
  tokenizer: Arc<Tokenizer>,
  model: Arc<dyn ModelService>,
}

impl EmotionAnalyzer {
  pub fn new(lexicon: Arc<Lexicon>, tokenizer: Arc<Tokenizer>, model: Arc<dyn ModelService>) -> Self {
    Self { lexicon, tokenizer, model }
  }

  /// Every token that is an imagery word of some category, once per category.
  pub fn extract_imagery(&self, text: &str) -> Vec<ImageryEmotion> {
    let mut out = Vec::new();
    for token in self.tokenizer.tokenize(text) {
      for category in self.lexicon.emotions() {
        if category.imagery.iter().any(|w| *w == token) {
          out.push(ImageryEmotion { word: token.clone(), emotion: category.name.clone() });
        }
      }
    }
    out
  }

  fn try_analyze(&self, text: &str) -> Result<EmotionResult> {
    let imagery = self.extract_imagery(text);
    let poem_embedding = self.model.embed(text)?;

    let mut scores = Vec::with_capacity(self.lexicon.emotions().len());
    for category in self.lexicon.emotions() {
      let hits = imagery.iter().filter(|ie| ie.emotion == category.name).count();
      let share = if imagery.is_empty() { 0.0 } else { hits as f64 / imagery.len() as f64 };
      let profile = self.model.embed(&category.profile_text())?;
      let similarity = cosine_similarity(&poem_embedding, &profile);
      scores.push(EmotionScore {
        emotion: category.name.clone(),
        score: IMAGERY_WEIGHT * share + SEMANTIC_WEIGHT * similarity,
      });
    }
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));

    let primary = scores.first().map(|s| s.emotion.clone()).unwrap_or_else(|| UNKNOWN_EMOTION.to_string());
    let secondary = scores.get(1).map(|s| s.emotion.clone());
    let analysis = render_analysis(&primary, secondary.as_deref(), &imagery, &scores);
    Ok(EmotionResult { primary, secondary, imagery, scores, analysis })
  }

  /// Analyze a poem. Model failures yield a degraded `unknown` result.
  #[instrument(level = "info", skip(self, text), fields(text_len = text.len()))]
  pub fn analyze(&self, text: &str) -> EmotionResult {
    match self.try_analyze(text) {
      Ok(r) => {
        info!(target: "emotion", primary = %r.primary, imagery = r.imagery.len(), "Emotion analyzed");
        r
      }
      Err(e) => {
        warn!(target: "emotion", error = %e, poem = %trunc_for_log(text, 20), "Emotion analysis failed");
        EmotionResult {
          primary: UNKNOWN_EMOTION.to_string(),
          secondary: None,
          imagery: Vec::new(),
          scores: Vec::new(),
          analysis: format!("分析失败：{}", e),
        }
      }
    }
  }
}

fn render_analysis(primary: &str, secondary: Option<&str>, imagery: &[ImageryEmotion], scores: &[EmotionScore]) -> String {
  let mut parts = vec![format!("主要情感：{}", primary)];
  if let Some(s) = secondary {
    parts.push(format!("辅助情感：{}", s));
  }
  if !imagery.is_empty() {
    parts.push("\n意象分析：".to_string());
    for ie in imagery {
      parts.push(format!("「{}」（{}）", ie.word, ie.emotion));
    }
  }
  parts.push("\n情感分布：".to_string());
  for s in scores.iter().take(2) {
    parts.push(format!("{}: {:.2}", s.emotion, s.score));
  }
  parts.join("\n")
}
