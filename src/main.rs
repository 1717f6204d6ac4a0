//! Poem Analyzer · classical Chinese poem analysis service
//!
//! - Axum HTTP + WebSocket API (`serve`, the default)
//! - CLI subcommands for every analysis action and for training
//! - Optional OpenAI integration (via environment variables)
//!
//! Important env variables:
//!   PORT               : u16 (default 3000)
//!   OPENAI_API_KEY     : enables OpenAI integration if present
//!   OPENAI_BASE_URL    : default "https://api.openai.com/v1"
//!   OPENAI_GEN_MODEL   : default "gpt-4o-mini"
//!   OPENAI_EMBED_MODEL : default "text-embedding-3-small"
//!   POEM_CONFIG_PATH   : path to TOML config (classifier, generation, lexicon)
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

use std::{net::SocketAddr, path::PathBuf, process::ExitCode, sync::Arc};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{error, info};

use poem_analyzer::logic::*;
use poem_analyzer::routes::build_router;
use poem_analyzer::state::AppState;
use poem_analyzer::telemetry;

#[derive(Parser, Debug)]
#[command(name = "poem-analyzer", version, about = "Classical Chinese poem analysis")]
struct Cli {
  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Run the HTTP + WebSocket server.
  Serve {
    /// Port to listen on; overrides PORT.
    #[arg(long)]
    port: Option<u16>,
  },
  /// Train the classifier and write the model artifacts.
  Train {
    /// Corpus CSV with `content` and `label` columns; defaults to the configured path.
    #[arg(long)]
    corpus: Option<PathBuf>,
  },
  /// Predict the theme of a poem.
  Classify { text: String },
  /// Classify random poems from the built-in bank against their labels.
  Samples {
    #[arg(short, long, default_value_t = DEFAULT_SAMPLES)]
    n: usize,
  },
  /// Score a poem on the four quality metrics.
  Score { text: String },
  /// Analyze the emotions and imagery of a poem.
  Emotion { text: String },
  /// Render a poem in modern Chinese; a random example when no text is given.
  Translate { text: Option<String> },
  /// Highlight and annotate lexicon keywords.
  Annotate { text: String },
  /// Check tones, rhyme and the five-character quatrain pattern.
  Meter { text: String },
  /// Generate quatrains and score them.
  Generate {
    #[arg(short, long, default_value_t = 1)]
    count: usize,
    #[arg(long)]
    seed: Option<String>,
  },
}

fn print_outcome<T: Serialize>(outcome: Result<T, String>) -> ExitCode {
  match outcome {
    Ok(v) => match serde_json::to_string_pretty(&v) {
      Ok(s) => {
        println!("{}", s);
        ExitCode::SUCCESS
      }
      Err(e) => {
        eprintln!("serialization error: {}", e);
        ExitCode::FAILURE
      }
    },
    Err(message) => {
      eprintln!("{}", message);
      ExitCode::FAILURE
    }
  }
}

fn serve(state: Arc<AppState>, port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
  // Read port from flag, env, or default to 3000.
  let port = port
    .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()))
    .unwrap_or(3000);
  let addr = SocketAddr::from(([0, 0, 0, 0], port));

  let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
  runtime.block_on(async move {
    // Build the HTTP router with routes, CORS and tracing layers.
    let app = build_router(state);
    let listener = TcpListener::bind(addr).await?;
    info!(target: "poem_analyzer", %addr, "HTTP server listening");
    axum::serve(listener, app)
      .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
      })
      .await?;
    Ok::<(), Box<dyn std::error::Error>>(())
  })
}

fn main() -> ExitCode {
  telemetry::init_tracing();
  let cli = Cli::parse();

  // Built outside the runtime: the blocking model client must not be created
  // or dropped on an async worker.
  let state = Arc::new(AppState::new());

  match cli.command.unwrap_or(Command::Serve { port: None }) {
    Command::Serve { port } => match serve(state.clone(), port) {
      Ok(()) => ExitCode::SUCCESS,
      Err(e) => {
        error!(target: "poem_analyzer", error = %e, "Server failed");
        ExitCode::FAILURE
      }
    },
    Command::Train { corpus } => match do_train(&state, corpus.as_deref()) {
      Ok(report) => {
        println!("{}", report);
        ExitCode::SUCCESS
      }
      Err(message) => {
        eprintln!("{}", message);
        ExitCode::FAILURE
      }
    },
    Command::Classify { text } => print_outcome(do_classify(&state, &text)),
    Command::Samples { n } => print_outcome(do_classify_samples(&state, n)),
    Command::Score { text } => print_outcome(do_score(&state, &text)),
    Command::Emotion { text } => print_outcome(do_emotion(&state, &text)),
    Command::Translate { text: Some(text) } => print_outcome(do_translate(&state, &text)),
    Command::Translate { text: None } => print_outcome(do_translate_random(&state)),
    Command::Annotate { text } => print_outcome(do_annotate(&state, &text)),
    Command::Meter { text } => print_outcome(do_meter(&text)),
    Command::Generate { count, seed } => print_outcome(do_generate(&state, count, seed.as_deref())),
  }
}
