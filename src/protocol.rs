//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{FilterCriteria, ProblemLevel, QuestionType};
use crate::error::{AppError, Result};

/// `{ "ok": true }` acknowledgement used by health and status updates.
#[derive(Debug, Serialize)]
pub struct OkOut {
    pub ok: bool,
}

/// Filter query string shared by `/answers`, `/stats` and `/worksheet`.
/// Form selects send empty strings for "no filter".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    pub student_id: Option<String>,
    pub grade: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub chapter: Option<String>,
}

impl FilterQuery {
    pub fn into_criteria(self) -> Result<FilterCriteria> {
        Ok(FilterCriteria {
            student_id: non_blank(self.student_id),
            grade: parse_small("grade", self.grade)?,
            start_date: non_blank(self.start_date),
            end_date: non_blank(self.end_date),
            chapter: non_blank(self.chapter),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChaptersQuery {
    pub grade: Option<String>,
    pub term: Option<String>,
}

impl ChaptersQuery {
    pub fn parse(self) -> Result<(Option<u8>, Option<u8>)> {
        Ok((parse_small("grade", self.grade)?, parse_small("term", self.term)?))
    }
}

/// Body of `POST /answers`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnswerIn {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    pub grade: u8,
    pub term: u8,
    #[serde(default)]
    pub chapter: String,
    pub problem_level: ProblemLevel,
    pub question_type: QuestionType,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(default)]
    pub image_type: Option<String>,
}

/// Body of `POST /answers/:id/status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusIn {
    pub is_resolved: bool,
}

/// Body of `POST /categorize`. `imageBase64` may carry a data-URL prefix.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizeIn {
    pub image_base64: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

pub fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_small(name: &str, s: Option<String>) -> Result<Option<u8>> {
    match non_blank(s) {
        None => Ok(None),
        Some(v) => v
            .parse::<u8>()
            .map(Some)
            .map_err(|_| AppError::InvalidInput(format!("{name} must be a small integer, got {v:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_values_impose_no_filter() {
        let q = FilterQuery {
            student_id: Some("".into()),
            grade: Some(" ".into()),
            chapter: Some("전체".into()),
            ..Default::default()
        };
        let c = q.into_criteria().unwrap();
        assert_eq!(c.student_id, None);
        assert_eq!(c.grade, None);
        // The "all" sentinel is resolved by the filter itself.
        assert_eq!(c.chapter.as_deref(), Some("전체"));
    }

    #[test]
    fn non_numeric_grade_is_rejected() {
        let q = FilterQuery { grade: Some("five".into()), ..Default::default() };
        assert!(matches!(q.into_criteria(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn save_body_uses_camel_case() {
        let body: SaveAnswerIn = serde_json::from_str(
            r#"{"studentId":"홍길동","grade":4,"term":2,"chapter":"삼각형",
                "problemLevel":"Low","questionType":"Concept","imageBase64":"AAAA"}"#,
        )
        .unwrap();
        assert_eq!(body.grade, 4);
        assert_eq!(body.problem_level, ProblemLevel::Low);
        assert_eq!(body.image_base64.as_deref(), Some("AAAA"));
        assert!(body.date.is_none());
    }
}
