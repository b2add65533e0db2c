//! Client for the spreadsheet-backed record store.
//!
//! The store speaks a small JSON protocol keyed by `action`:
//!   GET  ?action=get_answers   -> { status, data: WrongAnswer[] }
//!   GET  ?action=get_students  -> { status, data: string[] }
//!   POST { action: "save_answer",   payload }            -> { status, savedData }
//!   POST { action: "update_status", payload: {id, isResolved} } -> { status }
//!
//! Any reply with `status: "error"` becomes `AppError::RemoteRejected` carrying
//! the store's `message`. Image payloads are forwarded as base64; the store
//! persists them and fills `imageUrl`.

use std::time::Duration;

use reqwest::header::USER_AGENT;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{ImagePayload, NewWrongAnswer, WrongAnswer};
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct SheetStore {
  client: reqwest::Client,
  pub url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavePayload<'a> {
  #[serde(flatten)]
  record: &'a WrongAnswer,
  #[serde(skip_serializing_if = "Option::is_none")]
  image_base64: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  image_name: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  image_type: Option<&'a str>,
}

impl SheetStore {
  /// Construct the client if RECORD_STORE_URL is set; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let url = std::env::var("RECORD_STORE_URL").ok().filter(|u| !u.trim().is_empty())?;
    match Self::new(url) {
      Ok(s) => Some(s),
      Err(e) => {
        warn!(target: "odap_backend", error = %e, "Failed to build record store HTTP client.");
        None
      }
    }
  }

  pub fn new(url: impl Into<String>) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()?;
    Ok(Self { client, url: url.into() })
  }

  #[instrument(level = "info", skip(self))]
  pub async fn fetch_all(&self) -> Result<Vec<WrongAnswer>> {
    let body = self.get_action("get_answers").await?;
    let rows = match body.get("data") {
      Some(Value::Array(rows)) => rows.clone(),
      Some(Value::Null) | None => Vec::new(),
      Some(_) => return Err(AppError::RemoteUnavailable("get_answers: `data` is not a list".into())),
    };

    let total = rows.len();
    let answers: Vec<WrongAnswer> = rows
      .into_iter()
      .enumerate()
      .filter_map(|(i, row)| match serde_json::from_value::<WrongAnswer>(row) {
        Ok(a) => Some(a),
        Err(e) => {
          warn!(target: "store", row = i, error = %e, "Skipping malformed record row");
          None
        }
      })
      .collect();
    info!(target: "store", total, parsed = answers.len(), "Fetched records");
    Ok(answers)
  }

  #[instrument(level = "info", skip(self))]
  pub async fn fetch_students(&self) -> Result<Vec<String>> {
    let body = self.get_action("get_students").await?;
    let students = match body.get("data") {
      Some(Value::Array(items)) => items
        .iter()
        .filter_map(|v| match v {
          Value::String(s) if !s.is_empty() => Some(s.clone()),
          Value::Number(n) => Some(n.to_string()),
          _ => None,
        })
        .collect(),
      _ => Vec::new(),
    };
    Ok(students)
  }

  /// Persist a new record with a fresh id and `isResolved = false`.
  #[instrument(level = "info", skip(self, new), fields(grade = new.grade, term = new.term, has_image = new.image.is_some()))]
  pub async fn save(&self, new: NewWrongAnswer) -> Result<WrongAnswer> {
    let (record, image) = new.into_record(Uuid::new_v4().to_string());
    let image: Option<&ImagePayload> = image.as_ref();
    let payload = SavePayload {
      record: &record,
      image_base64: image.map(|i| i.base64.as_str()),
      image_name: image.map(|i| i.name.as_str()),
      image_type: image.map(|i| i.mime_type.as_str()),
    };

    let body = self.post_action("save_answer", &payload).await?;
    let saved = body
      .get("savedData")
      .cloned()
      .and_then(|v| serde_json::from_value::<WrongAnswer>(v).ok())
      .unwrap_or_else(|| record.clone());
    info!(target: "store", id = %saved.id, "Saved record");
    Ok(saved)
  }

  #[instrument(level = "info", skip(self))]
  pub async fn set_resolved(&self, id: &str, is_resolved: bool) -> Result<()> {
    self
      .post_action("update_status", &json!({ "id": id, "isResolved": is_resolved }))
      .await?;
    Ok(())
  }

  async fn get_action(&self, action: &str) -> Result<Value> {
    let res = self
      .client
      .get(&self.url)
      .header(USER_AGENT, "odap-backend/0.1")
      .query(&[("action", action)])
      .send()
      .await?;
    read_envelope(action, res).await
  }

  async fn post_action<P: Serialize + ?Sized>(&self, action: &str, payload: &P) -> Result<Value> {
    let res = self
      .client
      .post(&self.url)
      .header(USER_AGENT, "odap-backend/0.1")
      .json(&json!({ "action": action, "payload": payload }))
      .send()
      .await?;
    read_envelope(action, res).await
  }
}

async fn read_envelope(action: &str, res: reqwest::Response) -> Result<Value> {
  let status = res.status();
  if !status.is_success() {
    return Err(AppError::RemoteUnavailable(format!("{action}: HTTP {status}")));
  }
  let body: Value = res
    .json()
    .await
    .map_err(|e| AppError::RemoteUnavailable(format!("{action}: unreadable reply: {e}")))?;
  check_status(body)
}

/// Turn `{status: "error", message}` into a rejection; pass everything else through.
fn check_status(body: Value) -> Result<Value> {
  if body.get("status").and_then(Value::as_str) == Some("error") {
    let message = body
      .get("message")
      .and_then(Value::as_str)
      .unwrap_or("unknown store error")
      .to_string();
    return Err(AppError::RemoteRejected(message));
  }
  Ok(body)
}
