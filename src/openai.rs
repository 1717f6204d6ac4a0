//! Minimal OpenAI-compatible client backing `ModelService`.
//!
//! We only call `/embeddings` and `/chat/completions` (plain text).
//! Calls are instrumented and log model names, latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key. The client is blocking; build and drop it
//! outside any async runtime and call it from blocking worker threads.

use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::GenerationConfig;
use crate::model::{ModelService, ServiceError};
use crate::util::fill_template;

pub struct OpenAI {
  client: Client,
  api_key: String,
  pub base_url: String,
  pub gen_model: String,
  pub embed_model: String,
  generation: GenerationConfig,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env(generation: GenerationConfig) -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let gen_model =
      std::env::var("OPENAI_GEN_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    let embed_model =
      std::env::var("OPENAI_EMBED_MODEL").unwrap_or_else(|_| "text-embedding-3-small".into());

    match Self::new(api_key, base_url, gen_model, embed_model, generation) {
      Ok(oa) => Some(oa),
      Err(e) => {
        error!(target: "poem_analyzer", error = %e, "Failed to build HTTP client; OpenAI disabled");
        None
      }
    }
  }

  /// Client for an explicit endpoint. `base_url` includes the version prefix,
  /// e.g. `https://api.openai.com/v1`.
  pub fn new(
    api_key: String,
    base_url: String,
    gen_model: String,
    embed_model: String,
    generation: GenerationConfig,
  ) -> Result<Self, ServiceError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| ServiceError::Transport(e.to_string()))?;
    Ok(Self { client, api_key, base_url, gen_model, embed_model, generation })
  }

  fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<reqwest::blocking::Response, ServiceError> {
    let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
    let res = self.client.post(&url)
      .header(USER_AGENT, "poem-analyzer/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(body).send().map_err(|e| ServiceError::Transport(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      return Err(ServiceError::Http { status, message });
    }
    Ok(res)
  }

  /// Plain-text chat completion.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.gen_model))]
  fn chat_plain(&self, system: &str, user: &str, temperature: f32) -> Result<String, ServiceError> {
    let req = ChatCompletionRequest {
      model: self.gen_model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
    };

    let start = Instant::now();
    let body: ChatCompletionResponse = self
      .post("/chat/completions", &req)?
      .json()
      .map_err(|e| ServiceError::Decode(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, elapsed = ?start.elapsed(), "OpenAI usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default().trim().to_string();
    if text.is_empty() {
      return Err(ServiceError::Empty("completion"));
    }
    Ok(text)
  }
}

impl ModelService for OpenAI {
  #[instrument(level = "debug", skip(self, text), fields(model = %self.embed_model, text_len = text.len()))]
  fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
    let req = EmbeddingRequest { model: self.embed_model.clone(), input: text.to_string() };
    let body: EmbeddingResponse = self
      .post("/embeddings", &req)?
      .json()
      .map_err(|e| ServiceError::Decode(e.to_string()))?;
    let embedding = body.data.into_iter().next().map(|d| d.embedding).unwrap_or_default();
    if embedding.is_empty() {
      return Err(ServiceError::Empty("embedding"));
    }
    Ok(embedding)
  }

  fn generate(&self, seed: &str) -> Result<String, ServiceError> {
    let user = fill_template(&self.generation.user_template, &[("seed", seed)]);
    let start = Instant::now();
    let result = self.chat_plain(&self.generation.system_prompt, &user, self.generation.temperature);
    match &result {
      Ok(t) => info!(elapsed = ?start.elapsed(), out_chars = t.chars().count(), "Model generation received"),
      Err(e) => error!(elapsed = ?start.elapsed(), error = %e, "Model call failed during poem generation"),
    }
    result
  }

  fn name(&self) -> &str {
    "openai"
  }
}

// --- Wire types ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

#[derive(Serialize)]
struct EmbeddingRequest { model: String, input: String }
#[derive(Deserialize)]
struct EmbeddingResponse { data: Vec<EmbeddingData> }
#[derive(Deserialize)]
struct EmbeddingData { embedding: Vec<f32> }

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}
