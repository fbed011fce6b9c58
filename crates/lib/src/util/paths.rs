use std::path::MAIN_SEPARATOR_STR;

const SEPARATORS: [char; 2] = ['/', '\\'];

/// Normalize a path assembled by string concatenation.
///
/// A single leading separator is stripped so the result is relative to the
/// working directory. Both `/` and `\` are treated as separators and rejoined
/// with the host separator. Empty and `.` components are dropped and `..`
/// collapses lexically against the preceding component.
///
/// An input that normalizes to nothing yields `.`.
pub fn normalize_relative(raw: &str) -> String {
  let trimmed = raw.strip_prefix(SEPARATORS).unwrap_or(raw);

  let mut parts: Vec<&str> = Vec::new();
  for part in trimmed.split(SEPARATORS) {
    match part {
      "" | "." => {}
      ".." => match parts.last() {
        Some(last) if *last != ".." => {
          parts.pop();
        }
        _ => parts.push(".."),
      },
      part => parts.push(part),
    }
  }

  if parts.is_empty() {
    return ".".to_string();
  }

  parts.join(MAIN_SEPARATOR_STR)
}

/// Rewrite every `/` and `\` to the host separator, leaving everything else as is.
pub fn to_native_separators(raw: &str) -> String {
  raw.replace(SEPARATORS, MAIN_SEPARATOR_STR)
}
