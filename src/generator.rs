//! Poem generation through the model service, formatted as a five-character
//! quatrain (四行五言).

use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{info, instrument};

use crate::error::{AnalysisError, Result};
use crate::model::ModelService;
use crate::util::is_cjk;

const LINE_CHARS: usize = 5;
const QUATRAIN_CHARS: usize = 20;

/// Keep Han characters only and cut the first twenty into four lines of five.
pub fn format_quatrain(raw: &str) -> Result<String> {
  let han: Vec<char> = raw.chars().filter(|c| is_cjk(*c)).collect();
  if han.len() < QUATRAIN_CHARS {
    return Err(AnalysisError::GeneratedTooShort { found: han.len(), required: QUATRAIN_CHARS });
  }
  let lines: Vec<String> = han[..QUATRAIN_CHARS].chunks(LINE_CHARS).map(|c| c.iter().collect()).collect();
  Ok(lines.join("\n"))
}

pub struct PoemGenerator {
  model: Arc<dyn ModelService>,
  seeds: Vec<String>,
}

impl PoemGenerator {
  pub fn new(model: Arc<dyn ModelService>, seeds: Vec<String>) -> Self {
    Self { model, seeds }
  }

  pub fn random_seed(&self) -> String {
    self.seeds.choose(&mut rand::thread_rng()).cloned().unwrap_or_else(|| "春".to_string())
  }

  #[instrument(level = "info", skip(self), fields(model = self.model.name()))]
  pub fn generate(&self, seed: &str) -> Result<String> {
    let raw = self.model.generate(seed)?;
    let poem = format_quatrain(&raw)?;
    info!(target: "poem_analyzer", %seed, raw_chars = raw.chars().count(), "Poem generated");
    Ok(poem)
  }

  /// Generate from a random seed; returns the seed with the result.
  pub fn generate_random(&self) -> (String, Result<String>) {
    let seed = self.random_seed();
    let poem = self.generate(&seed);
    (seed, poem)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::LocalModel;

  #[test]
  fn quatrain_keeps_first_twenty_han_characters() {
    let out = format_quatrain("春眠不觉晓，处处闻啼鸟。夜来风雨声，花落知多少。再来").unwrap();
    assert_eq!(out, "春眠不觉晓\n处处闻啼鸟\n夜来风雨声\n花落知多少");
  }

  #[test]
  fn short_output_is_rejected() {
    let err = format_quatrain("abc 春眠不觉晓").unwrap_err();
    assert!(matches!(err, AnalysisError::GeneratedTooShort { found: 5, required: 20 }));
  }

  #[test]
  fn random_generation_uses_a_configured_seed() {
    let g = PoemGenerator::new(Arc::new(LocalModel::new()), vec!["月".into()]);
    let (seed, poem) = g.generate_random();
    assert_eq!(seed, "月");
    assert_eq!(poem.unwrap().lines().count(), 4);
  }
}
