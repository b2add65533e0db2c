//! Dashboard aggregation: counts, rates, and chart-ready projections.
//!
//! `analyze` is a pure function of the input slice. Every tie is broken by
//! encounter order, so the same input (in the same order) always produces the
//! same report.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{ProblemLevel, QuestionType, WrongAnswer};

const BAR_LIMIT: usize = 6;
const RECENT_LIMIT: usize = 100;
const RADAR_MIN_FULL_MARK: usize = 10;

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStats {
  pub total_wrong: usize,
  pub resolved: usize,
  pub resolution_rate: u32,
  pub worst_chapter: String,
  pub radar_data: Vec<RadarPoint>,
  pub bar_data: Vec<BarPoint>,
  pub pie_data: Vec<PieSlice>,
  pub recent_wrongs: Vec<WrongAnswer>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RadarPoint {
  pub subject: &'static str,
  #[serde(rename = "A")]
  pub count: usize,
  pub full_mark: usize,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct BarPoint {
  pub name: String,
  pub count: usize,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PieSlice {
  pub name: &'static str,
  pub value: usize,
}

pub fn analyze(answers: &[WrongAnswer]) -> AnalysisStats {
  let total_wrong = answers.len();
  let resolved = answers.iter().filter(|a| a.is_resolved).count();

  let chapters = chapter_counts(answers);
  let worst_chapter = worst_chapter(&chapters);

  let mut bar_data: Vec<BarPoint> = chapters
    .into_iter()
    .map(|(name, count)| BarPoint { name, count })
    .collect();
  // sort_by is stable: equal counts keep first-seen order.
  bar_data.sort_by(|a, b| b.count.cmp(&a.count));
  bar_data.truncate(BAR_LIMIT);

  AnalysisStats {
    total_wrong,
    resolved,
    resolution_rate: resolution_rate(resolved, total_wrong),
    worst_chapter,
    radar_data: radar(answers),
    bar_data,
    pie_data: pie(answers),
    recent_wrongs: recent(answers),
  }
}

/// Rounded percentage, half up. Zero for an empty set.
pub fn resolution_rate(resolved: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  ((200 * resolved + total) / (2 * total)) as u32
}

/// Chapter counts in first-encounter order.
fn chapter_counts(answers: &[WrongAnswer]) -> Vec<(String, usize)> {
  let mut index: HashMap<&str, usize> = HashMap::new();
  let mut counts: Vec<(String, usize)> = Vec::new();
  for a in answers {
    match index.get(a.chapter.as_str()) {
      Some(&i) => counts[i].1 += 1,
      None => {
        index.insert(a.chapter.as_str(), counts.len());
        counts.push((a.chapter.clone(), 1));
      }
    }
  }
  counts
}

fn worst_chapter(counts: &[(String, usize)]) -> String {
  let mut worst = "-";
  let mut max = 0;
  for (name, count) in counts {
    if *count > max {
      max = *count;
      worst = name.as_str();
    }
  }
  worst.to_string()
}

fn radar(answers: &[WrongAnswer]) -> Vec<RadarPoint> {
  let counts = QuestionType::ALL.map(|t| answers.iter().filter(|a| a.question_type == t).count());
  let full_mark = counts.iter().copied().max().unwrap_or(0).max(RADAR_MIN_FULL_MARK);
  QuestionType::ALL
    .into_iter()
    .zip(counts)
    .map(|(t, count)| RadarPoint { subject: t.label(), count, full_mark })
    .collect()
}

fn pie(answers: &[WrongAnswer]) -> Vec<PieSlice> {
  ProblemLevel::ALL
    .into_iter()
    .map(|l| PieSlice {
      name: l.as_str(),
      value: answers.iter().filter(|a| a.problem_level == l).count(),
    })
    .collect()
}

fn recent(answers: &[WrongAnswer]) -> Vec<WrongAnswer> {
  let mut out = answers.to_vec();
  out.sort_by(|a, b| b.date.cmp(&a.date));
  out.truncate(RECENT_LIMIT);
  out
}
