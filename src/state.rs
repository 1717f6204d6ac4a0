//! Application state: configuration, the shared lexicon, the model service and
//! one instance of every analyzer.
//!
//! This module owns:
//!   - the configuration (from TOML or defaults)
//!   - the lexicon and tokenizer, shared read-only by every analyzer
//!   - the model service (OpenAI when configured, the local model otherwise)
//!   - the lazily loaded classifier
//!
//! Everything here is immutable after construction except the classifier's
//! model slot, which is filled once on first use or after training.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::annotator::Annotator;
use crate::classifier::PoemClassifier;
use crate::config::{load_config_from_env, load_lexicon, AnalyzerConfig};
use crate::emotion::EmotionAnalyzer;
use crate::generator::PoemGenerator;
use crate::lexicon::Lexicon;
use crate::model::{LocalModel, ModelService};
use crate::openai::OpenAI;
use crate::scorer::PoemScorer;
use crate::tokenizer::Tokenizer;
use crate::translator::Translator;

pub struct AppState {
    pub config: AnalyzerConfig,
    pub lexicon: Arc<Lexicon>,
    pub tokenizer: Arc<Tokenizer>,
    pub model: Arc<dyn ModelService>,
    pub classifier: PoemClassifier,
    pub scorer: PoemScorer,
    pub emotion: EmotionAnalyzer,
    pub translator: Translator,
    pub annotator: Annotator,
    pub generator: PoemGenerator,
}

impl AppState {
    /// Build state from env: load config and lexicon, pick the model service.
    ///
    /// The OpenAI client is blocking, so call this outside any async runtime.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_config_from_env();
        let lexicon = load_lexicon(config.lexicon_path.as_deref());

        let model: Arc<dyn ModelService> = match OpenAI::from_env(config.generation.clone()) {
            Some(oa) => {
                info!(target: "poem_analyzer", base_url = %oa.base_url, gen_model = %oa.gen_model, embed_model = %oa.embed_model, "OpenAI enabled.");
                Arc::new(oa)
            }
            None => {
                info!(target: "poem_analyzer", "OpenAI disabled (no OPENAI_API_KEY). Using the local model.");
                Arc::new(LocalModel::new())
            }
        };

        Self::with_parts(config, lexicon, model)
    }

    /// Assemble state from explicit parts.
    pub fn with_parts(config: AnalyzerConfig, lexicon: Lexicon, model: Arc<dyn ModelService>) -> Self {
        let lexicon = Arc::new(lexicon);
        let tokenizer = Arc::new(Tokenizer::from_lexicon(&lexicon));
        info!(
            target: "poem_analyzer",
            dictionary = tokenizer.dictionary_size(),
            emotions = lexicon.emotions().len(),
            glosses = lexicon.glosses().len(),
            labels = ?config.classifier.labels,
            model = model.name(),
            "Analyzer state ready"
        );

        Self {
            classifier: PoemClassifier::new(config.classifier.clone(), tokenizer.clone()),
            scorer: PoemScorer::new(lexicon.clone(), tokenizer.clone(), model.clone()),
            emotion: EmotionAnalyzer::new(lexicon.clone(), tokenizer.clone(), model.clone()),
            translator: Translator::new(lexicon.clone()),
            annotator: Annotator::new(lexicon.clone()),
            generator: PoemGenerator::new(model.clone(), config.generation.seeds.clone()),
            config,
            lexicon,
            tokenizer,
            model,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
