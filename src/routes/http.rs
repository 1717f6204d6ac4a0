//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs basic request info; the analysis
//! itself runs on the blocking pool.

use std::sync::Arc;
use axum::{extract::{State, Query}, Json, response::IntoResponse};
use tracing::instrument;

use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut {
    ok: true,
    model: state.model.name().to_string(),
    trained: state.classifier.is_trained(),
    labels: state.classifier.labels().to_vec(),
  })
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_classify(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TextIn>,
) -> impl IntoResponse {
  Json(run_blocking(&state, move |s| do_classify(s, &body.text)).await)
}

#[instrument(level = "info", skip(state), fields(n = ?q.n))]
pub async fn http_get_classify_samples(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SamplesQuery>,
) -> impl IntoResponse {
  let n = q.n.unwrap_or(DEFAULT_SAMPLES);
  Json(run_blocking(&state, move |s| do_classify_samples(s, n)).await)
}

#[instrument(level = "info", skip(state, body), fields(count = ?body.count))]
pub async fn http_post_generate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateIn>,
) -> impl IntoResponse {
  let count = body.count.unwrap_or(DEFAULT_GENERATE);
  Json(run_blocking(&state, move |s| do_generate(s, count, body.seed.as_deref())).await)
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_score(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TextIn>,
) -> impl IntoResponse {
  Json(run_blocking(&state, move |s| do_score(s, &body.text)).await)
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_emotion(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TextIn>,
) -> impl IntoResponse {
  Json(run_blocking(&state, move |s| do_emotion(s, &body.text)).await)
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_annotate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TextIn>,
) -> impl IntoResponse {
  Json(run_blocking(&state, move |s| do_annotate(s, &body.text)).await)
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_translate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TextIn>,
) -> impl IntoResponse {
  Json(run_blocking(&state, move |s| do_translate(s, &body.text)).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_translate_random(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(run_blocking(&state, do_translate_random).await)
}

#[instrument(level = "info", skip(body), fields(text_len = body.text.len()))]
pub async fn http_post_pinyin(Json(body): Json<TextIn>) -> impl IntoResponse {
  Json(ActionOut::from(do_pinyin(&body.text)))
}

#[instrument(level = "info", skip(body), fields(text_len = body.text.len()))]
pub async fn http_post_meter(Json(body): Json<TextIn>) -> impl IntoResponse {
  Json(ActionOut::from(do_meter(&body.text)))
}
