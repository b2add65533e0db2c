//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Listing records and students (reads degrade to empty on store failure)
//!   - Dashboard statistics and the printable worksheet
//!   - Saving a record and flipping its resolution flag (errors propagate)
//!   - Image categorization through the candidate-model client

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Local, NaiveDate};
use tracing::{debug, info, instrument, warn};

use crate::domain::{FilterCriteria, ImagePayload, NewWrongAnswer, WrongAnswer};
use crate::error::{AppError, Result};
use crate::filter::apply_filters;
use crate::gemini::Categorization;
use crate::protocol::{non_blank, CategorizeIn, SaveAnswerIn};
use crate::state::AppState;
use crate::stats::{analyze, AnalysisStats};
use crate::util::split_data_url;
use crate::worksheet::{build_worksheet, Worksheet};

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Fetch every record and narrow it by `criteria`. Store failures yield an empty list.
#[instrument(level = "info", skip(state))]
pub async fn list_answers(state: &AppState, criteria: &FilterCriteria) -> Vec<WrongAnswer> {
  let Some(store) = &state.store else {
    debug!(target: "store", "No record store configured; returning no records.");
    return Vec::new();
  };
  match store.fetch_all().await {
    Ok(all) => {
      let total = all.len();
      let out = apply_filters(all, criteria);
      debug!(target: "store", total, matched = out.len(), "Records filtered");
      out
    }
    Err(e) => {
      warn!(target: "store", error = %e, "Fetching records failed; returning empty list");
      Vec::new()
    }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn list_students(state: &AppState) -> Vec<String> {
  let Some(store) = &state.store else { return Vec::new() };
  store.fetch_students().await.unwrap_or_else(|e| {
    warn!(target: "store", error = %e, "Fetching students failed; returning empty list");
    Vec::new()
  })
}

#[instrument(level = "info", skip(state))]
pub async fn load_stats(state: &AppState, criteria: &FilterCriteria) -> AnalysisStats {
  let answers = list_answers(state, criteria).await;
  let stats = analyze(&answers);
  info!(target: "stats", total = stats.total_wrong, resolved = stats.resolved, worst = %stats.worst_chapter, "Stats computed");
  stats
}

#[instrument(level = "info", skip(state))]
pub async fn load_worksheet(state: &AppState, criteria: &FilterCriteria) -> Worksheet {
  build_worksheet(list_answers(state, criteria).await)
}

/// Validate and persist a new record.
#[instrument(level = "info", skip(state, body), fields(grade = body.grade, term = body.term, has_image = body.image_base64.is_some()))]
pub async fn save_answer(state: &AppState, body: SaveAnswerIn) -> Result<WrongAnswer> {
  let new = validate_new_answer(body, Local::now().date_naive())?;
  let store = state.store.as_ref().ok_or(AppError::NotConfigured("RECORD_STORE_URL"))?;
  store.save(new).await
}

/// Flip a record to resolved. There is no way back to unresolved.
#[instrument(level = "info", skip(state))]
pub async fn update_status(state: &AppState, id: &str, is_resolved: bool) -> Result<()> {
  if id.trim().is_empty() {
    return Err(AppError::InvalidInput("id must not be empty".into()));
  }
  if !is_resolved {
    return Err(AppError::InvalidInput("records can only be marked resolved".into()));
  }
  let store = state.store.as_ref().ok_or(AppError::NotConfigured("RECORD_STORE_URL"))?;
  store.set_resolved(id, true).await?;
  info!(target: "store", %id, "Record marked resolved");
  Ok(())
}

#[instrument(level = "info", skip(state, body), fields(image_len = body.image_base64.len()))]
pub async fn categorize_image(state: &AppState, body: CategorizeIn) -> Result<Categorization> {
  let gemini = state.gemini.as_ref().ok_or(AppError::NotConfigured("GEMINI_API_KEY"))?;
  let (url_mime, payload) = split_data_url(&body.image_base64);
  check_base64(payload)?;
  let mime = non_blank(body.mime_type)
    .or_else(|| url_mime.map(String::from))
    .unwrap_or_else(|| DEFAULT_IMAGE_MIME.into());
  gemini.categorize(&state.prompts.categorize, payload, &mime).await
}

/// Check ranges, fill defaults, and unwrap the optional image.
pub fn validate_new_answer(body: SaveAnswerIn, today: NaiveDate) -> Result<NewWrongAnswer> {
  if !(1..=6).contains(&body.grade) {
    return Err(AppError::InvalidInput(format!("grade must be 1-6, got {}", body.grade)));
  }
  if !(1..=2).contains(&body.term) {
    return Err(AppError::InvalidInput(format!("term must be 1 or 2, got {}", body.term)));
  }
  let date = match non_blank(body.date) {
    Some(d) => NaiveDate::parse_from_str(&d, "%Y-%m-%d")
      .map_err(|_| AppError::InvalidInput(format!("date must be YYYY-MM-DD, got {d:?}")))?,
    None => today,
  };

  let image = match non_blank(body.image_base64) {
    None => None,
    Some(raw) => {
      let (url_mime, payload) = split_data_url(&raw);
      check_base64(payload)?;
      Some(ImagePayload {
        base64: payload.to_string(),
        name: non_blank(body.image_name).unwrap_or_else(|| "image".into()),
        mime_type: non_blank(body.image_type)
          .or_else(|| url_mime.map(String::from))
          .unwrap_or_else(|| DEFAULT_IMAGE_MIME.into()),
      })
    }
  };

  Ok(NewWrongAnswer {
    student_id: non_blank(body.student_id).unwrap_or_else(|| "unknown".into()),
    date: date.format("%Y-%m-%d").to_string(),
    grade: body.grade,
    term: body.term,
    chapter: body.chapter.trim().to_string(),
    problem_level: body.problem_level,
    question_type: body.question_type,
    memo: non_blank(body.memo),
    image,
  })
}

fn check_base64(payload: &str) -> Result<()> {
  match STANDARD.decode(payload) {
    Ok(bytes) if !bytes.is_empty() => Ok(()),
    Ok(_) => Err(AppError::InvalidInput("image is empty".into())),
    Err(e) => Err(AppError::InvalidInput(format!("image is not valid base64: {e}"))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{routing::get, Json, Router};
  use serde_json::{json, Value};

  use crate::domain::{ProblemLevel, QuestionType};
  use crate::store::SheetStore;
  use crate::testutil::spawn_mock;

  fn body() -> SaveAnswerIn {
    SaveAnswerIn {
      student_id: None,
      date: None,
      grade: 5,
      term: 1,
      chapter: " 약수와 배수 ".into(),
      problem_level: ProblemLevel::Mid,
      question_type: QuestionType::Computation,
      memo: Some("".into()),
      image_base64: None,
      image_name: None,
      image_type: None,
    }
  }

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
  }

  #[test]
  fn defaults_fill_student_and_date() {
    let n = validate_new_answer(body(), today()).unwrap();
    assert_eq!(n.student_id, "unknown");
    assert_eq!(n.date, "2024-06-01");
    assert_eq!(n.chapter, "약수와 배수");
    assert_eq!(n.memo, None);
    assert!(n.image.is_none());
  }

  #[test]
  fn out_of_range_grade_term_and_bad_date_are_rejected() {
    let mut b = body();
    b.grade = 7;
    assert!(matches!(validate_new_answer(b, today()), Err(AppError::InvalidInput(_))));
    let mut b = body();
    b.term = 3;
    assert!(validate_new_answer(b, today()).is_err());
    let mut b = body();
    b.date = Some("2024/06/01".into());
    assert!(validate_new_answer(b, today()).is_err());
  }

  #[test]
  fn data_url_image_is_stripped_and_typed() {
    let mut b = body();
    b.image_base64 = Some("data:image/png;base64,aGVsbG8=".into());
    let img = validate_new_answer(b, today()).unwrap().image.unwrap();
    assert_eq!(img.base64, "aGVsbG8=");
    assert_eq!(img.mime_type, "image/png");
    assert_eq!(img.name, "image");
  }

  #[test]
  fn invalid_base64_image_is_rejected() {
    let mut b = body();
    b.image_base64 = Some("not base64 at all!".into());
    assert!(matches!(validate_new_answer(b, today()), Err(AppError::InvalidInput(_))));
  }

  #[tokio::test]
  async fn reads_degrade_to_empty_when_store_errors() {
    let app = Router::new().route("/", get(|| async { Json(json!({ "status": "error", "message": "sheet missing" })) }));
    let base = spawn_mock(app).await;
    let state = AppState::from_parts(Some(SheetStore::new(base).unwrap()), None);

    let stats = load_stats(&state, &FilterCriteria::default()).await;
    assert_eq!(stats.total_wrong, 0);
    assert_eq!(stats.worst_chapter, "-");
    assert!(list_students(&state).await.is_empty());
  }

  #[tokio::test]
  async fn stats_and_worksheet_apply_filters() {
    let rows: Value = json!({ "status": "success", "data": [
      { "id": "1", "date": "2024-03-01", "studentId": "홍길동", "grade": 5, "term": 1, "chapter": "약수와 배수",
        "problemLevel": "Low", "questionType": "Concept", "isResolved": true },
      { "id": "2", "date": "2024-03-02", "studentId": "홍길동", "grade": 5, "term": 1, "chapter": "약수와 배수",
        "problemLevel": "Mid", "questionType": "Concept", "isResolved": "FALSE" },
      { "id": "3", "date": "2024-03-03", "studentId": "김철수", "grade": 4, "term": 1, "chapter": "각도",
        "problemLevel": "Top", "questionType": "Application", "isResolved": false }
    ]});
    let app = Router::new().route("/", get(move || async move { Json(rows) }));
    let base = spawn_mock(app).await;
    let state = AppState::from_parts(Some(SheetStore::new(base).unwrap()), None);
    let grade5 = FilterCriteria { grade: Some(5), ..Default::default() };

    let stats = load_stats(&state, &grade5).await;
    assert_eq!(stats.total_wrong, 2);
    assert_eq!(stats.resolution_rate, 50);
    assert_eq!(stats.worst_chapter, "약수와 배수");
    assert_eq!(stats.recent_wrongs[0].id, "2");

    let ws = load_worksheet(&state, &grade5).await;
    assert_eq!(ws.total_problems, 1);
    assert_eq!(ws.pages[0][0].id, "2");
  }

  #[tokio::test]
  async fn writes_without_store_fail_and_unresolve_is_refused() {
    let state = AppState::from_parts(None, None);
    assert!(matches!(save_answer(&state, body()).await, Err(AppError::NotConfigured(_))));
    assert!(matches!(update_status(&state, "a", false).await, Err(AppError::InvalidInput(_))));
    assert!(matches!(update_status(&state, "a", true).await, Err(AppError::NotConfigured(_))));
    assert!(list_answers(&state, &FilterCriteria::default()).await.is_empty());
  }

  #[tokio::test]
  async fn categorize_requires_api_key() {
    let state = AppState::from_parts(None, None);
    let r = categorize_image(&state, CategorizeIn { image_base64: "aGVsbG8=".into(), mime_type: None }).await;
    assert!(matches!(r, Err(AppError::NotConfigured("GEMINI_API_KEY"))));
  }
}
