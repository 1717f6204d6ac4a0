//! Core behaviors shared by the HTTP, WebSocket and CLI front ends.
//!
//! Every action runs one analysis to completion and turns any failure into a
//! readable message (`Err(String)`), so callers never see a panic or a typed
//! error. Actions are synchronous; the async front ends run them through
//! `run_blocking`.

use std::path::Path;
use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{error, info, instrument, warn};

use crate::classifier::ClassificationReport;
use crate::domain::{AnnotationResult, Classification, EmotionResult, ScoreReport, TranslationResult};
use crate::pinyin::to_pinyin_diacritics;
use crate::prosody::{check_meter, MeterReport};
use crate::protocol::{ActionOut, GeneratedPoem, PinyinOut, SampleOut, SamplesOut};
use crate::seeds::seed_poems;
use crate::state::AppState;
use crate::util::trunc_for_log;

pub const DEFAULT_SAMPLES: usize = 5;
pub const DEFAULT_GENERATE: usize = 5;
/// Upper bound for batch actions requested over the network.
pub const MAX_BATCH: usize = 20;

fn require_text(text: &str) -> Result<&str, String> {
  let t = text.trim();
  if t.is_empty() {
    Err("请输入诗词内容。".into())
  } else {
    Ok(t)
  }
}

/// Run a synchronous action on the blocking pool and wrap its outcome.
pub async fn run_blocking<T, F>(state: &Arc<AppState>, action: F) -> ActionOut<T>
where
  T: Send + 'static,
  F: FnOnce(&AppState) -> Result<T, String> + Send + 'static,
{
  let st = state.clone();
  match tokio::task::spawn_blocking(move || action(&st)).await {
    Ok(r) => r.into(),
    Err(e) => {
      error!(target: "poem_analyzer", error = %e, "Analysis worker failed");
      ActionOut::failed(format!("内部错误：{}", e))
    }
  }
}

#[instrument(level = "info", skip(state, corpus))]
pub fn do_train(state: &AppState, corpus: Option<&Path>) -> Result<ClassificationReport, String> {
  let result = match corpus {
    Some(p) => state.classifier.train_from_path(p),
    None => state.classifier.train_from_config(),
  };
  result.map_err(|e| {
    error!(target: "classifier", error = %e, "Training failed");
    format!("训练失败：{}", e)
  })
}

#[instrument(level = "info", skip(state, text), fields(text_len = text.len()))]
pub fn do_classify(state: &AppState, text: &str) -> Result<Classification, String> {
  let text = require_text(text)?;
  state.classifier.predict(text).map_err(|e| {
    warn!(target: "classifier", error = %e, "Classification failed");
    format!("分类失败：{}", e)
  })
}

/// Classify `n` random poems from the built-in bank against their labels.
#[instrument(level = "info", skip(state))]
pub fn do_classify_samples(state: &AppState, n: usize) -> Result<SamplesOut, String> {
  let model = state.classifier.model().map_err(|e| format!("分类失败：{}", e))?;
  let picked: Vec<_> = seed_poems()
    .choose_multiple(&mut rand::thread_rng(), n.clamp(1, MAX_BATCH))
    .copied()
    .collect();

  let samples: Vec<SampleOut> = picked
    .into_iter()
    .map(|p| {
      let classification = model.classify_tokens(&state.tokenizer.tokenize(p.text));
      SampleOut {
        poem: p.text.to_string(),
        expected: p.label.to_string(),
        predicted: classification.label.clone(),
        correct: classification.label == p.label,
        classification,
      }
    })
    .collect();
  let correct = samples.iter().filter(|s| s.correct).count();
  let accuracy = correct as f64 / samples.len().max(1) as f64;
  info!(target: "classifier", samples = samples.len(), correct, "Sample poems classified");
  Ok(SamplesOut { samples, accuracy })
}

/// Generate `count` poems and score each; failures are reported per poem.
#[instrument(level = "info", skip(state, seed))]
pub fn do_generate(state: &AppState, count: usize, seed: Option<&str>) -> Result<Vec<GeneratedPoem>, String> {
  let out = (0..count.clamp(1, MAX_BATCH))
    .map(|_| {
      let (seed, poem) = match seed.filter(|s| !s.trim().is_empty()) {
        Some(s) => (s.trim().to_string(), state.generator.generate(s.trim())),
        None => state.generator.generate_random(),
      };
      match poem {
        Ok(poem) => {
          let score = state.scorer.score(&poem);
          GeneratedPoem { seed, poem: Some(poem), score: Some(score), error: None }
        }
        Err(e) => {
          warn!(target: "poem_analyzer", %seed, error = %e, "Generation failed");
          GeneratedPoem { seed, poem: None, score: None, error: Some(format!("生成失败：{}", e)) }
        }
      }
    })
    .collect();
  Ok(out)
}

#[instrument(level = "info", skip(state, text), fields(text_len = text.len()))]
pub fn do_score(state: &AppState, text: &str) -> Result<ScoreReport, String> {
  let text = require_text(text)?;
  Ok(state.scorer.score(text))
}

#[instrument(level = "info", skip(state, text), fields(text_len = text.len()))]
pub fn do_emotion(state: &AppState, text: &str) -> Result<EmotionResult, String> {
  let text = require_text(text)?;
  Ok(state.emotion.analyze(text))
}

#[instrument(level = "info", skip(state, text), fields(text_len = text.len()))]
pub fn do_annotate(state: &AppState, text: &str) -> Result<AnnotationResult, String> {
  let text = require_text(text)?;
  Ok(state.annotator.annotate(text))
}

#[instrument(level = "info", skip(state, text), fields(text_len = text.len()))]
pub fn do_translate(state: &AppState, text: &str) -> Result<TranslationResult, String> {
  let text = require_text(text)?;
  Ok(state.translator.translate(text))
}

pub fn do_translate_random(state: &AppState) -> Result<TranslationResult, String> {
  let r = state.translator.random_example();
  info!(target: "translate", poem = %trunc_for_log(&r.original, 10), "Random example translated");
  Ok(r)
}

pub fn do_pinyin(text: &str) -> Result<PinyinOut, String> {
  let text = require_text(text)?;
  Ok(PinyinOut { text: text.to_string(), pinyin: to_pinyin_diacritics(text) })
}

pub fn do_meter(text: &str) -> Result<MeterReport, String> {
  let text = require_text(text)?;
  Ok(check_meter(text))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_text_is_a_message_not_an_error() {
    assert_eq!(do_pinyin("  \n").unwrap_err(), "请输入诗词内容。");
    assert!(do_meter("").is_err());
  }

  #[test]
  fn pinyin_action_trims_input() {
    let out = do_pinyin(" 明月 ").unwrap();
    assert_eq!(out.text, "明月");
    assert_eq!(out.pinyin, "míng yuè");
  }
}
