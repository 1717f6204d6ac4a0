//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::logic::*;
use crate::protocol::{ActionOut, ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "poem_analyzer", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "poem_analyzer", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "poem_analyzer", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "poem_analyzer", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "poem_analyzer", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &Arc<AppState>) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::Classify { text } =>
      ServerWsMessage::Classify { out: run_blocking(state, move |s| do_classify(s, &text)).await },

    ClientWsMessage::ClassifySamples { n } => {
      let n = n.unwrap_or(DEFAULT_SAMPLES);
      ServerWsMessage::ClassifySamples { out: run_blocking(state, move |s| do_classify_samples(s, n)).await }
    }

    ClientWsMessage::Generate { count, seed } => {
      let count = count.unwrap_or(DEFAULT_GENERATE);
      ServerWsMessage::Generate { out: run_blocking(state, move |s| do_generate(s, count, seed.as_deref())).await }
    }

    ClientWsMessage::Score { text } =>
      ServerWsMessage::Score { out: run_blocking(state, move |s| do_score(s, &text)).await },

    ClientWsMessage::Emotion { text } =>
      ServerWsMessage::Emotion { out: run_blocking(state, move |s| do_emotion(s, &text)).await },

    ClientWsMessage::Annotate { text } =>
      ServerWsMessage::Annotate { out: run_blocking(state, move |s| do_annotate(s, &text)).await },

    ClientWsMessage::Translate { text } =>
      ServerWsMessage::Translate { out: run_blocking(state, move |s| do_translate(s, &text)).await },

    ClientWsMessage::TranslateRandom =>
      ServerWsMessage::Translate { out: run_blocking(state, do_translate_random).await },

    ClientWsMessage::Pinyin { text } =>
      ServerWsMessage::Pinyin { out: ActionOut::from(do_pinyin(&text)) },

    ClientWsMessage::Meter { text } =>
      ServerWsMessage::Meter { out: ActionOut::from(do_meter(&text)) },
  }
}
