//! Submission checks applied before an entry reaches the store.

use std::fmt;

#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_author_len: usize,
    pub max_content_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_author_len: 64,
            max_content_len: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Empty(&'static str),
    TooLong { field: &'static str, max: usize },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Empty(field) => write!(f, "{field} is required"),
            Rejection::TooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
        }
    }
}

/// Trims both fields and checks them. Length is counted in characters, not bytes.
pub fn check_submission(author: &str, content: &str, limits: Limits) -> Result<(String, String), Rejection> {
    let author = check_field("author", author, limits.max_author_len)?;
    let content = check_field("content", content, limits.max_content_len)?;
    Ok((author, content))
}

fn check_field(field: &'static str, raw: &str, max: usize) -> Result<String, Rejection> {
    let t = raw.trim();
    if t.is_empty() {
        return Err(Rejection::Empty(field));
    }
    if t.chars().count() > max {
        return Err(Rejection::TooLong { field, max });
    }
    Ok(t.to_string())
}
