//! Small utility helpers used across modules.

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

/// Split `data:<mime>;base64,<payload>` into its MIME type and payload.
/// Plain base64 passes through with no MIME type.
pub fn split_data_url(s: &str) -> (Option<&str>, &str) {
  let s = s.trim();
  if let Some(rest) = s.strip_prefix("data:") {
    if let Some((meta, payload)) = rest.split_once(',') {
      let mime = meta.split(';').next().filter(|m| !m.is_empty());
      return (mime, payload);
    }
  }
  (None, s)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn truncation_respects_char_boundaries() {
    assert_eq!(trunc_for_log("short", 10), "short");
    let t = trunc_for_log("오답노트", 4);
    assert!(t.starts_with("오…"));
    assert!(t.ends_with("(12 bytes total)"));
  }

  #[test]
  fn data_url_prefix_is_split() {
    assert_eq!(split_data_url("data:image/png;base64,AAAA"), (Some("image/png"), "AAAA"));
    assert_eq!(split_data_url("AAAA"), (None, "AAAA"));
    assert_eq!(split_data_url("data:;base64,AAAA"), (None, "AAAA"));
  }
}
