//! Path filtering with include/exclude glob patterns
//!
//! Patterns use shell wildcard semantics: `*` matches any run of characters,
//! including `/`, so `*/debug/*` matches at any depth.
//! Exclude patterns always win over include patterns.

use glob::Pattern;
use thiserror::Error;

/// Errors raised while building a [`PathFilter`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid glob pattern: {pattern} ({reason})")]
    InvalidPattern { pattern: String, reason: String },
}

/// Path filter that decides which paths are visited
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    /// Empty = include everything not excluded
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PathFilter {
    /// Create a filter that accepts every path
    pub fn all() -> Self {
        Self::default()
    }

    /// Compile include and exclude globs
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, FilterError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Check if a path should be visited
    pub fn should_include(&self, path: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|p| p.matches(path)) {
            return false;
        }
        !self.exclude.iter().any(|p| p.matches(path))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, FilterError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| FilterError::InvalidPattern {
                pattern: p.clone(),
                reason: e.msg.to_string(),
            })
        })
        .collect()
}
