//! Printable review worksheet: unresolved problems, four to a page.

use serde::Serialize;

use crate::domain::WrongAnswer;

pub const PROBLEMS_PER_PAGE: usize = 4;

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Worksheet {
  pub total_problems: usize,
  pub pages: Vec<Vec<WrongAnswer>>,
}

/// Expects already-filtered records; drops resolved ones and keeps order.
pub fn build_worksheet(answers: Vec<WrongAnswer>) -> Worksheet {
  let open: Vec<WrongAnswer> = answers.into_iter().filter(|a| !a.is_resolved).collect();
  Worksheet {
    total_problems: open.len(),
    pages: open.chunks(PROBLEMS_PER_PAGE).map(|c| c.to_vec()).collect(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filter::tests::answer;

  #[test]
  fn pages_hold_four_unresolved_in_order() {
    let mut input: Vec<WrongAnswer> = (0..11)
      .map(|i| answer(&i.to_string(), "s", "2024-05-01", 4, "각도"))
      .collect();
    input[1].is_resolved = true;
    input[6].is_resolved = true;

    let ws = build_worksheet(input);
    assert_eq!(ws.total_problems, 9);
    assert_eq!(ws.pages.len(), 3);
    assert_eq!(ws.pages[2].len(), 1);
    let first: Vec<&str> = ws.pages[0].iter().map(|a| a.id.as_str()).collect();
    assert_eq!(first, vec!["0", "2", "3", "4"]);
    assert!(ws.pages.iter().flatten().all(|a| !a.is_resolved));
  }

  #[test]
  fn empty_when_everything_resolved() {
    let mut a = answer("1", "s", "2024-05-01", 4, "각도");
    a.is_resolved = true;
    let ws = build_worksheet(vec![a]);
    assert_eq!(ws.total_problems, 0);
    assert!(ws.pages.is_empty());
  }
}
