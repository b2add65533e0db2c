//! Built-in elementary math curriculum: chapter names keyed by grade and term.

use std::collections::BTreeMap;

use crate::config::CurriculumCfg;

const BUILTIN: &[(u8, u8, &[&str])] = &[
  (1, 1, &["9까지의 수", "여러 가지 모양", "덧셈과 뺄셈", "비교하기", "50까지의 수"]),
  (1, 2, &["100까지의 수", "덧셈과 뺄셈(1)", "모양과 시각", "덧셈과 뺄셈(2)", "규칙 찾기", "덧셈과 뺄셈(3)"]),
  (2, 1, &["세 자리 수", "여러 가지 도형", "덧셈과 뺄셈", "길이 재기", "분류하기", "곱셈"]),
  (2, 2, &["네 자리 수", "곱셈구구", "길이 재기", "시각과 시간", "표와 그래프", "규칙 찾기"]),
  (3, 1, &["덧셈과 뺄셈", "평면도형", "나눗셈", "곱셈", "길이와 시간", "분수와 소수"]),
  (3, 2, &["곱셈", "나눗셈", "원", "분수", "들이와 무게", "자료의 정리"]),
  (4, 1, &["큰 수", "각도", "곱셈과 나눗셈", "평면도형의 이동", "막대그래프", "규칙 찾기"]),
  (4, 2, &["분수의 덧셈과 뺄셈", "삼각형", "소수의 덧셈과 뺄셈", "사각형", "꺾은선그래프", "다각형"]),
  (5, 1, &["자연수의 혼합 계산", "약수와 배수", "규칙과 대응", "약분과 통분", "분수의 덧셈과 뺄셈", "다각형의 둘레와 넓이"]),
  (5, 2, &["수의 범위와 어림하기", "분수의 곱셈", "합동과 대칭", "소수의 곱셈", "직육면체", "평균과 가능성"]),
  (6, 1, &["분수의 나눗셈", "각기둥과 각뿔", "소수의 나눗셈", "비와 비율", "여러 가지 그래프", "직육면체의 부피와 겉넓이"]),
  (6, 2, &["분수의 나눗셈", "소수의 나눗셈", "공간과 입체", "비례식과 비례배분", "원의 넓이", "원기둥, 원뿔, 구"]),
];

#[derive(Clone, Debug)]
pub struct Curriculum {
  terms: BTreeMap<(u8, u8), Vec<String>>,
}

impl Curriculum {
  /// Built-in catalog with config entries replacing matching grade/term lists.
  pub fn with_overrides(overrides: &[CurriculumCfg]) -> Self {
    let mut terms: BTreeMap<(u8, u8), Vec<String>> = BUILTIN
      .iter()
      .map(|&(g, t, chapters)| ((g, t), chapters.iter().map(|c| c.to_string()).collect()))
      .collect();
    for o in overrides {
      terms.insert((o.grade, o.term), o.chapters.clone());
    }
    Self { terms }
  }

  /// Chapters for a grade and term; grade alone lists every term in order.
  pub fn chapters(&self, grade: Option<u8>, term: Option<u8>) -> Vec<String> {
    match (grade, term) {
      (Some(g), Some(t)) => self.terms.get(&(g, t)).cloned().unwrap_or_default(),
      (Some(g), None) => self
        .terms
        .range((g, 0)..=(g, u8::MAX))
        .flat_map(|(_, chapters)| chapters.iter().cloned())
        .collect(),
      _ => Vec::new(),
    }
  }
}

impl Default for Curriculum {
  fn default() -> Self { Self::with_overrides(&[]) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn grade_and_term_select_one_list() {
    let c = Curriculum::default();
    let ch = c.chapters(Some(5), Some(1));
    assert_eq!(ch.len(), 6);
    assert_eq!(ch[1], "약수와 배수");
  }

  #[test]
  fn grade_only_concatenates_terms_in_order() {
    let c = Curriculum::default();
    let all = c.chapters(Some(3), None);
    assert_eq!(all.len(), 12);
    assert_eq!(all[0], "덧셈과 뺄셈");
    assert_eq!(all[6], "곱셈");
  }

  #[test]
  fn missing_inputs_yield_nothing() {
    let c = Curriculum::default();
    assert!(c.chapters(None, Some(1)).is_empty());
    assert!(c.chapters(None, None).is_empty());
    assert!(c.chapters(Some(9), Some(1)).is_empty());
  }

  #[test]
  fn overrides_replace_builtin_term() {
    let c = Curriculum::with_overrides(&[CurriculumCfg {
      grade: 1,
      term: 1,
      chapters: vec!["수 세기".into()],
    }]);
    assert_eq!(c.chapters(Some(1), Some(1)), vec!["수 세기".to_string()]);
    assert_eq!(c.chapters(Some(1), Some(2)).len(), 6);
  }
}
