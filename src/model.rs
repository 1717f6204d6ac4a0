//! Language-model capability used by the scorer, the emotion analyzer and the
//! generator: `embed(text)` and `generate(seed)`.
//!
//! Two implementations ship with the crate: the OpenAI-compatible client in
//! `openai.rs` and `LocalModel`, a deterministic offline stand-in used when no
//! API key is configured (and handy in tests).

use thiserror::Error;

use crate::seeds::seed_poems;
use crate::util::{is_cjk, strip_punct};

#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("model service request failed: {0}")]
  Transport(String),

  #[error("model service returned HTTP {status}: {message}")]
  Http { status: u16, message: String },

  #[error("could not decode model service response: {0}")]
  Decode(String),

  #[error("model service returned an empty {0}")]
  Empty(&'static str),
}

/// Blocking model capability. Implementations must be shareable across the
/// worker threads that run analysis actions.
pub trait ModelService: Send + Sync {
  fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError>;
  fn generate(&self, seed: &str) -> Result<String, ServiceError>;

  /// Short name for logs.
  fn name(&self) -> &str {
    "model"
  }
}

/// Cosine similarity of two embeddings. Mismatched lengths or a zero vector
/// give 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
  if a.len() != b.len() || a.is_empty() {
    return 0.0;
  }
  let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
  for (x, y) in a.iter().zip(b) {
    let (x, y) = (*x as f64, *y as f64);
    dot += x * y;
    na += x * x;
    nb += y * y;
  }
  if na == 0.0 || nb == 0.0 {
    0.0
  } else {
    dot / (na.sqrt() * nb.sqrt())
  }
}

const LOCAL_DIM: usize = 256;

/// Offline model: hashed character uni/bi-gram embeddings and generation
/// from the built-in poem bank.
#[derive(Clone, Debug, Default)]
pub struct LocalModel;

impl LocalModel {
  pub fn new() -> Self {
    Self
  }
}

// FNV-1a; stable across platforms and releases.
fn fnv1a(s: &str) -> u64 {
  let mut h: u64 = 0xcbf2_9ce4_8422_2325;
  for b in s.as_bytes() {
    h ^= *b as u64;
    h = h.wrapping_mul(0x0100_0000_01b3);
  }
  h
}

impl ModelService for LocalModel {
  fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
    let chars: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    let mut v = vec![0f32; LOCAL_DIM];
    for (i, ch) in chars.iter().enumerate() {
      let uni = ch.to_string();
      v[(fnv1a(&uni) as usize) % LOCAL_DIM] += 1.0;
      if let Some(next) = chars.get(i + 1) {
        let bi: String = [*ch, *next].iter().collect();
        v[(fnv1a(&bi) as usize) % LOCAL_DIM] += 0.5;
      }
    }
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
      v.iter_mut().for_each(|x| *x /= norm);
    }
    Ok(v)
  }

  /// Picks the first five-character quatrain of the bank containing the seed,
  /// otherwise one chosen by the seed's hash.
  fn generate(&self, seed: &str) -> Result<String, ServiceError> {
    let quatrains: Vec<&str> = seed_poems()
      .iter()
      .map(|p| p.text)
      .filter(|t| strip_punct(t).chars().filter(|c| is_cjk(*c)).count() == 20)
      .collect();
    if quatrains.is_empty() {
      return Err(ServiceError::Empty("generation"));
    }
    let pick = quatrains
      .iter()
      .find(|t| !seed.is_empty() && t.contains(seed))
      .copied()
      .unwrap_or_else(|| quatrains[(fnv1a(seed) as usize) % quatrains.len()]);
    Ok(pick.to_string())
  }

  fn name(&self) -> &str {
    "local"
  }
}
