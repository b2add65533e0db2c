//! Domain models: wrong-answer records, their enumerated tags, and the filter query.

use serde::{Deserialize, Deserializer, Serialize};

/// Difficulty bucket of a problem.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProblemLevel {
  Low,
  Mid,
  High,
  Top,
}

impl ProblemLevel {
  pub const ALL: [ProblemLevel; 4] = [Self::Low, Self::Mid, Self::High, Self::Top];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Low => "Low",
      Self::Mid => "Mid",
      Self::High => "High",
      Self::Top => "Top",
    }
  }

  /// Exact (case-sensitive) match against the wire names.
  pub fn parse(s: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|l| l.as_str() == s)
  }
}

impl Default for ProblemLevel {
  fn default() -> Self { ProblemLevel::Mid }
}

/// What kind of thinking the problem asks for.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QuestionType {
  Concept,
  Computation,
  Application,
  ProblemSolving,
}

impl QuestionType {
  pub const ALL: [QuestionType; 4] = [
    Self::Concept,
    Self::Computation,
    Self::Application,
    Self::ProblemSolving,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Concept => "Concept",
      Self::Computation => "Computation",
      Self::Application => "Application",
      Self::ProblemSolving => "ProblemSolving",
    }
  }

  /// Korean chart label shown on the dashboard radar.
  pub fn label(self) -> &'static str {
    match self {
      Self::Concept => "개념",
      Self::Computation => "계산",
      Self::Application => "응용",
      Self::ProblemSolving => "문제해결",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|t| t.as_str() == s)
  }
}

impl Default for QuestionType {
  fn default() -> Self { QuestionType::Computation }
}

/// One logged wrong answer, as stored in the remote sheet.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WrongAnswer {
  #[serde(deserialize_with = "flexible_string")]
  pub id: String,
  #[serde(default, deserialize_with = "flexible_string")]
  pub student_id: String,
  pub date: String, // YYYY-MM-DD
  pub grade: u8,
  pub term: u8,
  #[serde(default, deserialize_with = "flexible_string")]
  pub chapter: String,
  pub problem_level: ProblemLevel,
  pub question_type: QuestionType,
  #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
  pub memo: Option<String>,
  #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
  #[serde(default, deserialize_with = "flexible_bool")]
  pub is_resolved: bool,
}

/// Image attached to a new record; bytes are base64 without a data-URL prefix.
#[derive(Clone, Debug, PartialEq)]
pub struct ImagePayload {
  pub base64: String,
  pub name: String,
  pub mime_type: String,
}

/// Input of a save: every record field except `id` and `isResolved`.
#[derive(Clone, Debug, PartialEq)]
pub struct NewWrongAnswer {
  pub student_id: String,
  pub date: String,
  pub grade: u8,
  pub term: u8,
  pub chapter: String,
  pub problem_level: ProblemLevel,
  pub question_type: QuestionType,
  pub memo: Option<String>,
  pub image: Option<ImagePayload>,
}

impl NewWrongAnswer {
  /// Materialize the record that the store is asked to persist.
  pub fn into_record(self, id: String) -> (WrongAnswer, Option<ImagePayload>) {
    let rec = WrongAnswer {
      id,
      student_id: self.student_id,
      date: self.date,
      grade: self.grade,
      term: self.term,
      chapter: self.chapter,
      problem_level: self.problem_level,
      question_type: self.question_type,
      memo: self.memo,
      image_url: None,
      is_resolved: false,
    };
    (rec, self.image)
  }
}

/// Chapter value the UI uses for "all chapters".
pub const ALL_CHAPTERS: &str = "전체";

/// Per-request query. `None` imposes no constraint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterCriteria {
  pub student_id: Option<String>,
  pub grade: Option<u8>,
  pub start_date: Option<String>,
  pub end_date: Option<String>,
  pub chapter: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
  Str(String),
  Int(i64),
  Float(f64),
  Bool(bool),
}

impl Cell {
  fn into_string(self) -> String {
    match self {
      Cell::Str(s) => s,
      Cell::Int(n) => n.to_string(),
      Cell::Float(f) => f.to_string(),
      Cell::Bool(b) => b.to_string(),
    }
  }
}

/// Sheet cells that look numeric come back as numbers; read them as text.
fn flexible_string<'de, D>(d: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<Cell>::deserialize(d)?.map(Cell::into_string).unwrap_or_default())
}

fn empty_as_none<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let v = Option::<Cell>::deserialize(d)?.map(Cell::into_string);
  Ok(v.filter(|s| !s.is_empty()))
}

/// The sheet may hand back `true`/`false` or the strings "TRUE"/"FALSE".
fn flexible_bool<'de, D>(d: D) -> Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum BoolOrString {
    Bool(bool),
    Str(String),
  }
  match Option::<BoolOrString>::deserialize(d)? {
    Some(BoolOrString::Bool(b)) => Ok(b),
    Some(BoolOrString::Str(s)) => Ok(s.trim().eq_ignore_ascii_case("true")),
    None => Ok(false),
  }
}
