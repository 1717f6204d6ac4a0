mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{state_with, ConstantModel};
use poem_analyzer::routes::build_router;

async fn call(app: axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn app(dir: &std::path::Path) -> axum::Router {
    build_router(Arc::new(state_with(Arc::new(ConstantModel), dir)))
}

#[tokio::test]
async fn health_reports_an_untrained_classifier() {
    let dir = tempfile::tempdir().unwrap();
    let req = Request::get("/api/v1/health").body(Body::empty()).unwrap();
    let (status, v) = call(app(dir.path()), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["ok"], true);
    assert_eq!(v["trained"], false);
    assert_eq!(v["labels"], json!(["山水", "咏史", "送别"]));
}

#[tokio::test]
async fn translate_endpoint_renders_modern_text() {
    let dir = tempfile::tempdir().unwrap();
    let (status, v) = call(app(dir.path()), post("/api/v1/translate", json!({ "text": "床前明月光" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["ok"], true);
    assert_eq!(v["result"]["translation"], "床前明亮的月亮光。");
}

#[tokio::test]
async fn classify_before_training_is_a_readable_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (status, v) = call(app(dir.path()), post("/api/v1/classify", json!({ "text": "床前明月光" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["ok"], false);
    assert!(v.get("result").is_none());
    assert!(v["message"].as_str().unwrap().starts_with("分类失败"));
}

#[tokio::test]
async fn empty_text_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (_, v) = call(app(dir.path()), post("/api/v1/score", json!({ "text": "   " }))).await;
    assert_eq!(v["ok"], false);
    assert_eq!(v["message"], "请输入诗词内容。");
}

#[tokio::test]
async fn score_endpoint_returns_a_full_report() {
    let dir = tempfile::tempdir().unwrap();
    let body = json!({ "text": "春眠不觉晓，处处闻啼鸟。夜来风雨声，花落知多少。" });
    let (_, v) = call(app(dir.path()), post("/api/v1/score", body)).await;
    assert_eq!(v["ok"], true);
    assert_eq!(v["result"]["rhyme"]["score"], 20.0);
    assert_eq!(v["result"]["theme"]["score"], 25.0);
    let total = v["result"]["total"].as_f64().unwrap();
    assert!(total > 0.0 && total <= 100.0);
}

#[tokio::test]
async fn pinyin_endpoint_uses_tone_marks() {
    let dir = tempfile::tempdir().unwrap();
    let (_, v) = call(app(dir.path()), post("/api/v1/pinyin", json!({ "text": "明月" }))).await;
    assert_eq!(v["ok"], true);
    assert_eq!(v["result"]["pinyin"], "míng yuè");
}

#[tokio::test]
async fn generate_endpoint_scores_each_poem() {
    let dir = tempfile::tempdir().unwrap();
    let (_, v) = call(app(dir.path()), post("/api/v1/generate", json!({ "count": 2, "seed": "白" }))).await;
    assert_eq!(v["ok"], true);
    let poems = v["result"].as_array().unwrap();
    assert_eq!(poems.len(), 2);
    for p in poems {
        assert_eq!(p["seed"], "白");
        assert_eq!(p["poem"], "白日依山尽\n黄河入海流\n欲穷千里目\n更上一层楼");
        assert!(p["score"]["total"].as_f64().is_some());
    }
}
