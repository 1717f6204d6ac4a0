#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use poem_analyzer::config::{AnalyzerConfig, ClassifierConfig};
use poem_analyzer::seeds::seed_poems;
use poem_analyzer::{AppState, Lexicon, ModelService, ServiceError};

/// Every text embeds to the same unit vector.
pub struct ConstantModel;

impl ModelService for ConstantModel {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, ServiceError> {
        Ok(vec![1.0, 0.0, 0.0, 0.0])
    }

    fn generate(&self, _seed: &str) -> Result<String, ServiceError> {
        Ok("白日依山尽，黄河入海流。欲穷千里目，更上一层楼。".to_string())
    }
}

/// A model whose every call fails like an unreachable endpoint.
pub struct DownModel;

impl ModelService for DownModel {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, ServiceError> {
        Err(ServiceError::Transport("connection refused".into()))
    }

    fn generate(&self, _seed: &str) -> Result<String, ServiceError> {
        Err(ServiceError::Transport("connection refused".into()))
    }
}

/// Embeds each known line to a fixed vector; anything else to a zero vector.
pub struct LineTableModel {
    pub table: Vec<(&'static str, Vec<f32>)>,
}

impl ModelService for LineTableModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        Ok(self
            .table
            .iter()
            .find(|(line, _)| *line == text)
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| vec![0.0, 0.0]))
    }

    fn generate(&self, _seed: &str) -> Result<String, ServiceError> {
        Err(ServiceError::Empty("completion"))
    }
}

pub fn config_in(model_dir: &Path) -> AnalyzerConfig {
    AnalyzerConfig {
        classifier: ClassifierConfig {
            model_dir: model_dir.to_path_buf(),
            epochs: 30,
            ..ClassifierConfig::default()
        },
        ..AnalyzerConfig::default()
    }
}

pub fn state_with(model: Arc<dyn ModelService>, model_dir: &Path) -> AppState {
    AppState::with_parts(config_in(model_dir), Lexicon::builtin(), model)
}

/// The built-in labeled bank as CSV text.
pub fn bank_csv() -> String {
    let mut out = String::from("title,content,label\n");
    for (i, p) in seed_poems().iter().enumerate() {
        out.push_str(&format!("poem{},{},{}\n", i, p.text, p.label));
    }
    out
}
