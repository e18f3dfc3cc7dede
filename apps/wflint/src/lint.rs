//! Lint runner: loads workflow files, applies the rule battery and reduces
//! findings to a severity.
//!
//! Files are evaluated in parallel; each file's findings keep their own
//! order and reports come back in the order the files were given.

use crate::checks::{check_workflow, RuleSettings};
use crate::models::workflow::WorkflowDocument;
use crate::models::{FileReport, Finding, Level, LintResult, Severity, Summary};
use crate::registry::ActionRegistry;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Exit code when no input documents were found.
pub const EXIT_NO_INPUT: i32 = 255;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not be read: {0}")]
    Io(#[from] std::io::Error),
    #[error("is not valid workflow YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Read and deserialize one workflow file.
pub fn load_workflow(path: &Path) -> Result<WorkflowDocument, LoadError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&data)?)
}

/// Highest severity among `findings`; `None` when there are none.
pub fn max_severity(findings: &[Finding]) -> Severity {
    findings
        .iter()
        .map(|f| Severity::from(f.level))
        .max()
        .unwrap_or(Severity::None)
}

/// Map an aggregate severity to the process exit code.
///
/// Errors always fail; warnings fail only in strict mode.
pub fn exit_code(severity: Severity, strict: bool) -> i32 {
    match severity {
        Severity::Error => 2,
        Severity::Warning if strict => 1,
        Severity::Warning | Severity::None => 0,
    }
}

/// Lint a single file. Load failures become one error finding.
pub fn lint_file(
    path: &Path,
    file: String,
    settings: &RuleSettings,
    registry: &dyn ActionRegistry,
) -> FileReport {
    let findings = match load_workflow(path) {
        Ok(doc) => check_workflow(&doc, settings, registry),
        Err(e) => {
            tracing::warn!(file = %file, error = %e, "failed to load workflow");
            vec![Finding::error(format!("Workflow file {}", e))]
        }
    };
    let severity = max_severity(&findings);
    FileReport {
        file,
        findings,
        severity,
    }
}

/// Lint every file and summarize. Paths are displayed relative to `base`
/// when possible.
pub fn run_lint(
    files: &[PathBuf],
    base: &Path,
    settings: &RuleSettings,
    registry: &dyn ActionRegistry,
) -> LintResult {
    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| {
            let shown = pathdiff::diff_paths(path, base)
                .filter(|p| !p.as_os_str().is_empty() && !p.starts_with(".."))
                .unwrap_or_else(|| path.clone())
                .to_string_lossy()
                .to_string();
            tracing::debug!(file = %shown, "linting");
            lint_file(path, shown, settings, registry)
        })
        .collect();

    let mut summary = Summary {
        files: reports.len(),
        ..Summary::default()
    };
    for f in reports.iter().flat_map(|r| r.findings.iter()) {
        match f.level {
            Level::Error => summary.errors += 1,
            Level::Warning => summary.warnings += 1,
        }
    }
    let severity = reports
        .iter()
        .map(|r| r.severity)
        .max()
        .unwrap_or(Severity::None);
    LintResult {
        files: reports,
        summary,
        severity,
    }
}
