//! Token templates and their expansion.
//!
//! Templates reference named values from a [`Resolver`] with `${name}`.
//! Expansion is plain text substitution: values are inserted verbatim, never
//! escaped, and never re-scanned for further placeholders.
//!
//! # Escaping
//!
//! `$${` produces a literal `${`. Any other `$` passes through unchanged.
//!
//! # Example
//!
//! ```
//! use sitebuild_lib::template::{parse, Segment};
//!
//! let segments = parse("${sourcePath}/_site").unwrap();
//! assert_eq!(segments, vec![
//!     Segment::Token("sourcePath".to_string()),
//!     Segment::Literal("/_site".to_string()),
//! ]);
//! ```

pub mod step;

use std::collections::HashMap;

use thiserror::Error;

pub use step::{Arg, StepTemplate, expand_steps};

/// A segment of parsed template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text (no placeholders)
  Literal(String),

  /// A `${name}` reference
  Token(String),
}

/// Errors that can occur during template parsing or expansion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
  #[error("unclosed placeholder at position {0}")]
  Unclosed(usize),

  #[error("empty placeholder at position {0}")]
  EmptyToken(usize),

  #[error("unknown token: {0}")]
  UnknownToken(String),
}

/// Supplies token values during expansion.
pub trait Resolver {
  /// Look up a token by name. `None` means the token does not exist.
  fn resolve(&self, name: &str) -> Option<&str>;
}

impl Resolver for HashMap<String, String> {
  fn resolve(&self, name: &str) -> Option<&str> {
    self.get(name).map(String::as_str)
  }
}

/// Parse a template into literal and token segments.
///
/// # Errors
///
/// Returns an error if a placeholder is unclosed or has an empty name.
pub fn parse(input: &str) -> Result<Vec<Segment>, TemplateError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '$' {
      literal.push(ch);
      continue;
    }

    match chars.peek() {
      Some((_, '{')) => {
        chars.next(); // consume the {

        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }

        let mut name = String::new();
        let mut found_close = false;
        for (_, c) in chars.by_ref() {
          if c == '}' {
            found_close = true;
            break;
          }
          name.push(c);
        }

        if !found_close {
          return Err(TemplateError::Unclosed(pos));
        }

        let name = name.trim();
        if name.is_empty() {
          return Err(TemplateError::EmptyToken(pos));
        }
        segments.push(Segment::Token(name.to_string()));
      }
      Some((_, '$')) => {
        chars.next(); // consume the second $

        // "$${" is the escape for a literal "${"
        if let Some((_, '{')) = chars.peek() {
          chars.next();
          literal.push_str("${");
        } else {
          literal.push_str("$$");
        }
      }
      _ => literal.push('$'),
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

/// Parse and substitute in one step.
///
/// # Errors
///
/// Returns an error if parsing fails or a token is unknown to the resolver.
pub fn substitute(input: &str, resolver: &impl Resolver) -> Result<String, TemplateError> {
  let segments = parse(input)?;
  substitute_segments(&segments, resolver)
}

/// Substitute tokens in pre-parsed segments.
pub fn substitute_segments(segments: &[Segment], resolver: &impl Resolver) -> Result<String, TemplateError> {
  let mut result = String::new();

  for segment in segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Token(name) => {
        let value = resolver
          .resolve(name)
          .ok_or_else(|| TemplateError::UnknownToken(name.clone()))?;
        result.push_str(value);
      }
    }
  }

  Ok(result)
}

/// Expand an ordered list of templates, preserving order.
pub fn expand_all<S: AsRef<str>>(templates: &[S], resolver: &impl Resolver) -> Result<Vec<String>, TemplateError> {
  templates
    .iter()
    .map(|template| substitute(template.as_ref(), resolver))
    .collect()
}

/// Join expanded commands into one chained line, e.g. with `" && "`.
pub fn join_commands<S: AsRef<str>>(commands: &[S], conjunction: &str) -> String {
  commands
    .iter()
    .map(|command| command.as_ref())
    .collect::<Vec<&str>>()
    .join(conjunction)
}
