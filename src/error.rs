//! Error types for the analysis pipeline.
//!
//! Corpus and model-artifact failures are fatal for the action that hit them.
//! `InsufficientLines` and `Service` are local: the scorer and the emotion
//! analyzer turn them into degraded fields instead of failing the report.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ServiceError;

#[derive(Debug, Error)]
pub enum AnalysisError {
  #[error("corpus file {0} does not exist")]
  CorpusMissing(PathBuf),

  #[error("failed to read corpus {path}: {source}")]
  CorpusIo {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("corpus {0} could not be decoded with any supported text encoding")]
  CorpusEncoding(PathBuf),

  #[error("corpus {path} is malformed: {reason}")]
  CorpusFormat { path: PathBuf, reason: String },

  #[error("corpus {0} contains no usable rows")]
  CorpusEmpty(PathBuf),

  #[error("corpus has {rows} usable row(s); at least {required} are needed to train")]
  CorpusTooSmall { rows: usize, required: usize },

  #[error("no trained model found in {0}; train the classifier first")]
  ModelNotTrained(PathBuf),

  #[error("failed to persist model artifact {path}: {reason}")]
  ModelPersist { path: PathBuf, reason: String },

  #[error("poem has {found} line(s); at least {required} are needed")]
  InsufficientLines { found: usize, required: usize },

  #[error("generated text too short for a quatrain ({found} of {required} characters)")]
  GeneratedTooShort { found: usize, required: usize },

  #[error(transparent)]
  Service(#[from] ServiceError),
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
