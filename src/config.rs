//! Loading analyzer configuration (classifier settings, generation prompts and
//! an optional lexicon file) from TOML.
//!
//! See `AnalyzerConfig` for the expected schema. Every section is optional;
//! missing keys take the defaults below.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{error, info};

use crate::lexicon::Lexicon;
use crate::seeds::default_generation_seeds;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AnalyzerConfig {
  #[serde(default)]
  pub classifier: ClassifierConfig,
  #[serde(default)]
  pub generation: GenerationConfig,
  /// TOML file replacing the built-in lexicon.
  #[serde(default)]
  pub lexicon_path: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
  pub labels: Vec<String>,
  pub corpus_path: PathBuf,
  pub model_dir: PathBuf,
  pub test_fraction: f64,
  pub seed: u64,
  pub epochs: usize,
  pub lambda: f64,
}

impl Default for ClassifierConfig {
  fn default() -> Self {
    Self {
      labels: vec!["山水".into(), "咏史".into(), "送别".into()],
      corpus_path: PathBuf::from("data/poem_classification_processed.csv"),
      model_dir: PathBuf::from("models"),
      test_fraction: 0.2,
      seed: 42,
      epochs: 50,
      lambda: 1e-3,
    }
  }
}

/// Prompts used when generating through a remote model.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
  pub seeds: Vec<String>,
  pub system_prompt: String,
  /// `{seed}` is replaced by the seed character.
  pub user_template: String,
  pub temperature: f32,
}

impl Default for GenerationConfig {
  fn default() -> Self {
    Self {
      seeds: default_generation_seeds(),
      system_prompt: "你是一位精通格律的古典诗人。只输出诗句本身，不要标题、作者、注释或解释。".into(),
      user_template: "以「{seed}」为开头，写一首五言绝句，共四句，每句五个字。".into(),
      temperature: 0.9,
    }
  }
}

fn read_config(path: &str) -> Option<AnalyzerConfig> {
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<AnalyzerConfig>(&s) {
      Ok(cfg) => {
        info!(target: "poem_analyzer", %path, "Loaded analyzer config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "poem_analyzer", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "poem_analyzer", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// Attempt to load `AnalyzerConfig` from POEM_CONFIG_PATH. Any IO or parse
/// error is logged and the defaults are used.
pub fn load_config_from_env() -> AnalyzerConfig {
  std::env::var("POEM_CONFIG_PATH")
    .ok()
    .and_then(|path| read_config(&path))
    .unwrap_or_default()
}

/// Load the lexicon named by the config, falling back to the built-in tables.
pub fn load_lexicon(path: Option<&Path>) -> Lexicon {
  let Some(path) = path else {
    return Lexicon::builtin();
  };
  let parsed = std::fs::read_to_string(path)
    .map_err(|e| e.to_string())
    .and_then(|s| Lexicon::from_toml_str(&s).map_err(|e| e.to_string()));
  match parsed {
    Ok(lx) => {
      info!(target: "poem_analyzer", path = %path.display(), words = lx.words().len(), "Loaded lexicon (TOML)");
      lx
    }
    Err(e) => {
      error!(target: "poem_analyzer", path = %path.display(), error = %e, "Failed to load lexicon; using built-in tables");
      Lexicon::builtin()
    }
  }
}
