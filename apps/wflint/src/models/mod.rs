//! Shared data models for lint findings, per-file reports and summaries.

pub mod workflow;

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
/// Level attached to a single finding.
pub enum Level {
    Warning,
    Error,
}

impl Level {
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
/// Aggregate severity of a set of findings. Ordered `None < Warning < Error`.
pub enum Severity {
    #[default]
    None,
    Warning,
    Error,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::Warning => Severity::Warning,
            Level::Error => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A single lint problem.
pub struct Finding {
    pub description: String,
    pub level: Level,
}

impl Finding {
    pub fn warning(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            level: Level::Warning,
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            level: Level::Error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
/// Findings for one workflow file, in discovery order.
pub struct FileReport {
    pub file: String,
    pub findings: Vec<Finding>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Aggregated counts used by printers.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub files: usize,
}

#[derive(Debug, Clone, Serialize)]
/// Lint results container.
pub struct LintResult {
    pub files: Vec<FileReport>,
    pub summary: Summary,
    pub severity: Severity,
}
