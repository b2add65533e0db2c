//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, Query, State}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::Result;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(OkOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_answers(
  State(state): State<Arc<AppState>>,
  Query(q): Query<FilterQuery>,
) -> Result<impl IntoResponse> {
  let criteria = q.into_criteria()?;
  let answers = list_answers(&state, &criteria).await;
  info!(target: "store", count = answers.len(), "HTTP answers served");
  Ok(Json(answers))
}

#[instrument(level = "info", skip(state, body), fields(grade = body.grade, term = body.term))]
pub async fn http_save_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SaveAnswerIn>,
) -> Result<impl IntoResponse> {
  let saved = save_answer(&state, body).await?;
  info!(target: "store", id = %saved.id, "HTTP answer saved");
  Ok(Json(saved))
}

#[instrument(level = "info", skip(state, body), fields(is_resolved = body.is_resolved))]
pub async fn http_update_status(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<StatusIn>,
) -> Result<impl IntoResponse> {
  update_status(&state, &id, body.is_resolved).await?;
  Ok(Json(OkOut { ok: true }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_students(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(list_students(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_stats(
  State(state): State<Arc<AppState>>,
  Query(q): Query<FilterQuery>,
) -> Result<impl IntoResponse> {
  let criteria = q.into_criteria()?;
  Ok(Json(load_stats(&state, &criteria).await))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_worksheet(
  State(state): State<Arc<AppState>>,
  Query(q): Query<FilterQuery>,
) -> Result<impl IntoResponse> {
  let criteria = q.into_criteria()?;
  let ws = load_worksheet(&state, &criteria).await;
  info!(target: "worksheet", problems = ws.total_problems, pages = ws.pages.len(), "HTTP worksheet served");
  Ok(Json(ws))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_chapters(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ChaptersQuery>,
) -> Result<impl IntoResponse> {
  let (grade, term) = q.parse()?;
  Ok(Json(state.curriculum.chapters(grade, term)))
}

#[instrument(level = "info", skip(state, body), fields(image_len = body.image_base64.len()))]
pub async fn http_post_categorize(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CategorizeIn>,
) -> Result<impl IntoResponse> {
  let c = categorize_image(&state, body).await?;
  Ok(Json(c))
}
