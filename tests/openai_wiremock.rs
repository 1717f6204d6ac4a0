use poem_analyzer::config::GenerationConfig;
use poem_analyzer::openai::OpenAI;
use poem_analyzer::{ModelService, ServiceError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The client is blocking: build, call and drop it on a blocking worker.
async fn with_client<T, F>(uri: String, call: F) -> T
where
    T: Send + 'static,
    F: FnOnce(&OpenAI) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let client = OpenAI::new(
            "sk-test".into(),
            uri,
            "gen-test".into(),
            "embed-test".into(),
            GenerationConfig::default(),
        )
        .unwrap();
        call(&client)
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn embedding_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "embed-test", "input": "床前明月光" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{ "object": "embedding", "index": 0, "embedding": [0.5, -0.25, 1.0] }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let got = with_client(server.uri(), |c| c.embed("床前明月光")).await.unwrap();
    assert_eq!(got, vec![0.5, -0.25, 1.0]);
}

#[tokio::test(flavor = "multi_thread")]
async fn completion_text_is_trimmed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "gen-test" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "  春风拂柳绿，\n夜雨润花红。\n" } }],
            "usage": { "prompt_tokens": 40, "completion_tokens": 20, "total_tokens": 60 }
        })))
        .mount(&server)
        .await;

    let got = with_client(server.uri(), |c| c.generate("春")).await.unwrap();
    assert_eq!(got, "春风拂柳绿，\n夜雨润花红。");
}

#[tokio::test(flavor = "multi_thread")]
async fn error_status_maps_to_http_error_with_api_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let err = with_client(server.uri(), |c| c.embed("月")).await.unwrap_err();
    match err {
        ServiceError::Http { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn non_json_error_body_is_kept_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = with_client(server.uri(), |c| c.generate("月")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Http { status: 502, ref message } if message == "bad gateway"));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_embedding_list_is_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let err = with_client(server.uri(), |c| c.embed("月")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Empty("embedding")));
}

#[tokio::test(flavor = "multi_thread")]
async fn blank_completion_is_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "   " } }]
        })))
        .mount(&server)
        .await;

    let err = with_client(server.uri(), |c| c.generate("月")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Empty("completion")));
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = with_client(server.uri(), |c| c.embed("月")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Decode(_)));
}
