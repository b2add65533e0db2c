//! Loading app configuration (categorization prompt + optional curriculum overrides) from TOML.
//!
//! See `AppConfig` and `Prompts` for expected schema. Endpoints and secrets are
//! read from the environment by the clients themselves.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub curriculum: Vec<CurriculumCfg>,
}

/// Curriculum entry accepted in TOML configuration. Replaces the built-in
/// chapter list for the same grade/term.
///
/// ```toml
/// [[curriculum]]
/// grade = 5
/// term = 1
/// chapters = ["자연수의 혼합 계산", "약수와 배수"]
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct CurriculumCfg {
  pub grade: u8,
  pub term: u8,
  pub chapters: Vec<String>,
}

/// Prompts sent to the generative model.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub categorize: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      categorize: r#"Analyze this math problem image (Korean elementary school math) and categorize it.

Fields to determine:
1. problemLevel:
   - "Low": Basic simple problems
   - "Mid": Standard textbook problems
   - "High": Challenging problems requiring multiple steps
   - "Top": Olympiad or very difficult problems

2. questionType:
   - "Concept": Asking for definitions or basic properties
   - "Computation": Pure calculation
   - "Application": Word problems, applying concepts to situations
   - "ProblemSolving": Complex reasoning, spatial puzzle, or deep logic

Return ONLY a raw JSON string (no markdown formatting) with this structure:
{ "problemLevel": "...", "questionType": "..." }"#
        .into(),
    }
  }
}

/// Parse config text. Split out from the env loader so it can be tested.
pub fn parse_app_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

/// Attempt to load `AppConfig` from APP_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("APP_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_app_config(&s) {
      Ok(cfg) => {
        info!(target: "odap_backend", %path, curriculum_overrides = cfg.curriculum.len(), "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "odap_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "odap_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = parse_app_config("").unwrap();
    assert!(cfg.curriculum.is_empty());
    assert!(cfg.prompts.categorize.contains("problemLevel"));
  }

  #[test]
  fn reads_prompt_and_curriculum_tables() {
    let cfg = parse_app_config(
      r#"
[prompts]
categorize = "Tag this image."

[[curriculum]]
grade = 2
term = 1
chapters = ["세 자리 수", "여러 가지 도형"]
"#,
    )
    .unwrap();
    assert_eq!(cfg.prompts.categorize, "Tag this image.");
    assert_eq!(cfg.curriculum.len(), 1);
    assert_eq!(cfg.curriculum[0].chapters[1], "여러 가지 도형");
  }

  #[test]
  fn malformed_curriculum_is_an_error() {
    assert!(parse_app_config("[[curriculum]]\ngrade = \"two\"").is_err());
  }
}
