//! Classical Chinese poem analysis: theme classification, quality scoring,
//! emotion/imagery analysis, rule-based translation, keyword annotation,
//! metre checks and generation through a pluggable model service.
//!
//! The analyzers are synchronous and share one read-only `Lexicon`. The
//! `routes` module exposes them over HTTP and WebSocket (axum); the binary
//! also offers them as CLI subcommands.

pub mod annotator;
pub mod classifier;
pub mod config;
pub mod corpus;
pub mod domain;
pub mod emotion;
pub mod error;
pub mod generator;
pub mod lexicon;
pub mod logic;
pub mod model;
pub mod openai;
pub mod pinyin;
pub mod prosody;
pub mod protocol;
pub mod routes;
pub mod scorer;
pub mod seeds;
pub mod state;
pub mod svm;
pub mod telemetry;
pub mod tfidf;
pub mod tokenizer;
pub mod translator;
pub mod util;

pub use domain::{Classification, EmotionResult, MetricScore, Poem, ScoreReport, TranslationResult};
pub use error::{AnalysisError, Result};
pub use lexicon::Lexicon;
pub use model::{LocalModel, ModelService, ServiceError};
pub use state::AppState;
