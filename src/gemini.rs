//! Minimal Gemini client for tagging a problem photo with difficulty and type.
//!
//! We only call `models/{model}:generateContent` with one text part and one
//! inline image part. Model names come and go, so the client walks an ordered
//! list of candidates and returns the first usable reply. Calls are
//! instrumented and log model names, latencies, and reply sizes (never image
//! bytes or the API key). The key travels in a header, never in the URL.

use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::{ProblemLevel, QuestionType};
use crate::error::{AppError, Result};
use crate::util::trunc_for_log;

const API_KEY_HEADER: &str = "x-goog-api-key";

pub const DEFAULT_MODELS: &[&str] = &[
  "gemini-1.5-flash",
  "gemini-1.5-flash-latest",
  "gemini-1.5-pro",
  "gemini-pro-vision",
];

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub models: Vec<String>,
}

/// Difficulty/type tags suggested for an image.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Categorization {
  pub problem_level: ProblemLevel,
  pub question_type: QuestionType,
  /// Candidate model that produced the reply.
  pub model: String,
  /// True when a returned value was outside its enum and replaced by the default.
  pub normalized: bool,
}

/// Why a single candidate was skipped.
#[derive(Error, Debug)]
enum CandidateError {
  #[error("model not found or unsupported (HTTP {0})")]
  Unsupported(u16),
  #[error("HTTP {0}: {1}")]
  Http(u16, String),
  #[error("transport: {0}")]
  Transport(reqwest::Error),
  #[error("unusable reply: {0}")]
  Reply(String),
}

impl Gemini {
  /// Construct the client if we find GEMINI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty())?;
    let base_url = std::env::var("GEMINI_BASE_URL")
      .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
    let models = std::env::var("GEMINI_MODELS")
      .ok()
      .map(|s| parse_model_list(&s))
      .filter(|m| !m.is_empty())
      .unwrap_or_else(|| DEFAULT_MODELS.iter().map(|m| m.to_string()).collect());
    match Self::new(api_key, base_url, models) {
      Ok(g) => Some(g),
      Err(e) => {
        warn!(target: "odap_backend", error = %e, "Failed to build Gemini HTTP client.");
        None
      }
    }
  }

  pub fn new(api_key: String, base_url: String, models: Vec<String>) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, api_key, base_url, models })
  }

  /// Try each candidate model in order until one returns a parseable reply.
  #[instrument(level = "info", skip(self, prompt, image_base64), fields(image_len = image_base64.len(), candidates = self.models.len()))]
  pub async fn categorize(&self, prompt: &str, image_base64: &str, mime_type: &str) -> Result<Categorization> {
    let mut failures: Vec<String> = Vec::new();
    for model in &self.models {
      let start = Instant::now();
      match self.try_model(model, prompt, image_base64, mime_type).await {
        Ok(c) => {
          info!(target: "categorize", %model, elapsed = ?start.elapsed(), level = c.problem_level.as_str(), kind = c.question_type.as_str(), normalized = c.normalized, "Image categorized");
          return Ok(c);
        }
        Err(e) => {
          warn!(target: "categorize", %model, elapsed = ?start.elapsed(), error = %e, "Candidate model failed; trying next");
          failures.push(format!("{model}: {e}"));
        }
      }
    }
    if failures.is_empty() {
      return Err(AppError::CategorizationFailed("no candidate models configured".into()));
    }
    Err(AppError::CategorizationFailed(failures.join("; ")))
  }

  async fn try_model(
    &self,
    model: &str,
    prompt: &str,
    image_base64: &str,
    mime_type: &str,
  ) -> std::result::Result<Categorization, CandidateError> {
    let url = format!("{}/models/{}:generateContent", self.base_url.trim_end_matches('/'), model);
    let req = GenerateRequest {
      contents: vec![Content {
        parts: vec![
          Part::Text { text: prompt },
          Part::Inline { inline_data: InlineData { mime_type, data: image_base64 } },
        ],
      }],
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "odap-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(API_KEY_HEADER, &self.api_key)
      .json(&req).send().await
      .map_err(|e| CandidateError::Transport(e.without_url()))?;

    let status = res.status();
    if !status.is_success() {
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or(body);
      if status.as_u16() == 404 || msg.to_lowercase().contains("not supported") {
        return Err(CandidateError::Unsupported(status.as_u16()));
      }
      return Err(CandidateError::Http(status.as_u16(), trunc_for_log(&msg, 200)));
    }

    let body: GenerateResponse = res
      .json()
      .await
      .map_err(|e| CandidateError::Reply(format!("undecodable body: {}", e.without_url())))?;
    let text = body
      .candidates
      .into_iter()
      .next()
      .and_then(|c| c.content)
      .and_then(|c| c.parts.into_iter().next())
      .and_then(|p| p.text)
      .ok_or_else(|| CandidateError::Reply("no candidate text".into()))?;
    info!(target: "categorize", %model, reply_len = text.len(), reply = %trunc_for_log(&text, 120), "Model reply received");

    let (problem_level, question_type, normalized) = parse_reply(&text).map_err(CandidateError::Reply)?;
    Ok(Categorization { problem_level, question_type, model: model.to_string(), normalized })
  }
}

/// Comma-separated candidate list, blanks dropped.
pub fn parse_model_list(s: &str) -> Vec<String> {
  s.split(',').map(str::trim).filter(|m| !m.is_empty()).map(String::from).collect()
}

/// Remove markdown code fences the model likes to wrap JSON in.
pub fn strip_code_fences(text: &str) -> String {
  text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse the model's JSON reply and coerce both fields into their enums.
///
/// Missing fields or invalid JSON are errors. Values outside the enums fall
/// back to `Mid` / `Computation` and set the `normalized` flag.
pub fn parse_reply(text: &str) -> std::result::Result<(ProblemLevel, QuestionType, bool), String> {
  let cleaned = strip_code_fences(text);
  let v: Value = serde_json::from_str(&cleaned).map_err(|e| format!("JSON parse error: {e}"))?;
  let level_raw = v.get("problemLevel").ok_or("missing problemLevel")?;
  let type_raw = v.get("questionType").ok_or("missing questionType")?;

  let level = level_raw.as_str().and_then(ProblemLevel::parse);
  let kind = type_raw.as_str().and_then(QuestionType::parse);
  if level.is_none() {
    warn!(target: "categorize", value = %level_raw, "problemLevel outside enum; defaulting to Mid");
  }
  if kind.is_none() {
    warn!(target: "categorize", value = %type_raw, "questionType outside enum; defaulting to Computation");
  }
  let normalized = level.is_none() || kind.is_none();
  Ok((level.unwrap_or_default(), kind.unwrap_or_default(), normalized))
}

// --- generateContent DTOs ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
  contents: Vec<Content<'a>>,
}
#[derive(Serialize)]
struct Content<'a> {
  parts: Vec<Part<'a>>,
}
#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
  Text { text: &'a str },
  Inline { inline_data: InlineData<'a> },
}
#[derive(Serialize)]
struct InlineData<'a> {
  mime_type: &'a str,
  data: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<ResponseCandidate>,
}
#[derive(Deserialize)]
struct ResponseCandidate {
  #[serde(default)]
  content: Option<ResponseContent>,
}
#[derive(Deserialize)]
struct ResponseContent {
  #[serde(default)]
  parts: Vec<ResponsePart>,
}
#[derive(Deserialize)]
struct ResponsePart {
  #[serde(default)]
  text: Option<String>,
}

/// Try to extract a clean error message from a Google API error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
