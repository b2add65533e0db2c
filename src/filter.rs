//! Record filtering. Order-preserving; every specified criterion must hold.

use crate::domain::{FilterCriteria, WrongAnswer, ALL_CHAPTERS};

impl FilterCriteria {
  /// True when `a` satisfies every criterion that is set.
  ///
  /// Date bounds compare the zero-padded ISO strings lexicographically, which
  /// matches chronological order for `YYYY-MM-DD`.
  pub fn matches(&self, a: &WrongAnswer) -> bool {
    if let Some(s) = &self.student_id {
      if !a.student_id.contains(s.as_str()) { return false; }
    }
    if let Some(g) = self.grade {
      if a.grade != g { return false; }
    }
    if let Some(start) = &self.start_date {
      if a.date.as_str() < start.as_str() { return false; }
    }
    if let Some(end) = &self.end_date {
      if a.date.as_str() > end.as_str() { return false; }
    }
    if let Some(ch) = self.chapter.as_deref().filter(|c| *c != ALL_CHAPTERS) {
      if a.chapter != ch { return false; }
    }
    true
  }
}

/// Keep the records matching `criteria`, in their original order.
pub fn apply_filters(answers: Vec<WrongAnswer>, criteria: &FilterCriteria) -> Vec<WrongAnswer> {
  answers.into_iter().filter(|a| criteria.matches(a)).collect()
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::domain::{ProblemLevel, QuestionType};

  pub(crate) fn answer(id: &str, student: &str, date: &str, grade: u8, chapter: &str) -> WrongAnswer {
    WrongAnswer {
      id: id.into(),
      student_id: student.into(),
      date: date.into(),
      grade,
      term: 1,
      chapter: chapter.into(),
      problem_level: ProblemLevel::Mid,
      question_type: QuestionType::Computation,
      memo: None,
      image_url: None,
      is_resolved: false,
    }
  }

  fn ids(v: &[WrongAnswer]) -> Vec<&str> {
    v.iter().map(|a| a.id.as_str()).collect()
  }

  fn sample() -> Vec<WrongAnswer> {
    vec![
      answer("1", "김철수", "2024-03-01", 5, "약수와 배수"),
      answer("2", "홍길동", "2024-03-05", 4, "큰 수"),
      answer("3", "김철수", "2024-03-10", 5, "약분과 통분"),
      answer("4", "홍길동", "2024-04-01", 5, "약수와 배수"),
      answer("5", "unknown", "2024-04-02", 3, "덧셈과 뺄셈"),
    ]
  }

  #[test]
  fn no_criteria_keeps_everything_in_order() {
    let out = apply_filters(sample(), &FilterCriteria::default());
    assert_eq!(ids(&out), vec!["1", "2", "3", "4", "5"]);
  }

  #[test]
  fn grade_filter_preserves_relative_order() {
    let c = FilterCriteria { grade: Some(5), ..Default::default() };
    let out = apply_filters(sample(), &c);
    assert_eq!(ids(&out), vec!["1", "3", "4"]);
    assert!(out.iter().all(|a| a.grade == 5));
  }

  #[test]
  fn student_filter_is_substring_match() {
    let c = FilterCriteria { student_id: Some("철".into()), ..Default::default() };
    assert_eq!(ids(&apply_filters(sample(), &c)), vec!["1", "3"]);
  }

  #[test]
  fn date_bounds_are_inclusive() {
    let c = FilterCriteria {
      start_date: Some("2024-03-05".into()),
      end_date: Some("2024-04-01".into()),
      ..Default::default()
    };
    assert_eq!(ids(&apply_filters(sample(), &c)), vec!["2", "3", "4"]);
  }

  #[test]
  fn all_chapters_sentinel_means_no_filter() {
    let all = FilterCriteria { chapter: Some(ALL_CHAPTERS.into()), ..Default::default() };
    assert_eq!(apply_filters(sample(), &all).len(), 5);

    let one = FilterCriteria { chapter: Some("약수와 배수".into()), ..Default::default() };
    assert_eq!(ids(&apply_filters(sample(), &one)), vec!["1", "4"]);
  }

  #[test]
  fn combined_criteria_can_yield_empty() {
    let c = FilterCriteria {
      student_id: Some("홍길동".into()),
      grade: Some(3),
      ..Default::default()
    };
    assert!(apply_filters(sample(), &c).is_empty());
  }
}
