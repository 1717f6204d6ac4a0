//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{
    AnnotationResult, Classification, EmotionResult, ScoreReport, TranslationResult,
};
use crate::prosody::MeterReport;

/// Envelope for every action: either a result or a readable message.
#[derive(Debug, Serialize)]
pub struct ActionOut<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ActionOut<T> {
    pub fn failed(message: impl Into<String>) -> Self {
        Self { ok: false, result: None, message: Some(message.into()) }
    }
}

impl<T> From<Result<T, String>> for ActionOut<T> {
    fn from(r: Result<T, String>) -> Self {
        match r {
            Ok(result) => Self { ok: true, result: Some(result), message: None },
            Err(message) => Self::failed(message),
        }
    }
}

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Classify {
        text: String,
    },
    ClassifySamples {
        #[serde(default)]
        n: Option<usize>,
    },
    Generate {
        #[serde(default)]
        count: Option<usize>,
        #[serde(default)]
        seed: Option<String>,
    },
    Score {
        text: String,
    },
    Emotion {
        text: String,
    },
    Annotate {
        text: String,
    },
    Translate {
        text: String,
    },
    TranslateRandom,
    Pinyin {
        text: String,
    },
    Meter {
        text: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Classify {
        #[serde(flatten)]
        out: ActionOut<Classification>,
    },
    ClassifySamples {
        #[serde(flatten)]
        out: ActionOut<SamplesOut>,
    },
    Generate {
        #[serde(flatten)]
        out: ActionOut<Vec<GeneratedPoem>>,
    },
    Score {
        #[serde(flatten)]
        out: ActionOut<ScoreReport>,
    },
    Emotion {
        #[serde(flatten)]
        out: ActionOut<EmotionResult>,
    },
    Annotate {
        #[serde(flatten)]
        out: ActionOut<AnnotationResult>,
    },
    Translate {
        #[serde(flatten)]
        out: ActionOut<TranslationResult>,
    },
    Pinyin {
        #[serde(flatten)]
        out: ActionOut<PinyinOut>,
    },
    Meter {
        #[serde(flatten)]
        out: ActionOut<MeterReport>,
    },
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct TextIn {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SamplesQuery {
    pub n: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateIn {
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub seed: Option<String>,
}

/// One bank poem classified against its known label.
#[derive(Debug, Serialize)]
pub struct SampleOut {
    pub poem: String,
    pub expected: String,
    pub predicted: String,
    pub correct: bool,
    pub classification: Classification,
}

#[derive(Debug, Serialize)]
pub struct SamplesOut {
    pub samples: Vec<SampleOut>,
    pub accuracy: f64,
}

/// A generated poem with its score, or the reason generation failed.
#[derive(Debug, Serialize)]
pub struct GeneratedPoem {
    pub seed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PinyinOut {
    pub text: String,
    pub pinyin: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub model: String,
    pub trained: bool,
    pub labels: Vec<String>,
}
