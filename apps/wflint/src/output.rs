//! Output rendering for lint results.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-file findings and a top-level summary.

use crate::models::{FileReport, Level, LintResult};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Print lint results in the requested format.
pub fn print_lint(res: &LintResult, output: &str) {
    match output {
        "json" => match serde_json::to_string_pretty(&compose_lint_json(res)) {
            Ok(s) => println!("{}", s),
            Err(e) => tracing::error!(error = %e, "failed to serialize lint results"),
        },
        _ => print!("{}", render_human(res, use_colors(output))),
    }
}

/// Human form: `# file` header then one `  - level description` line per
/// finding. Files without findings are omitted.
pub fn render_human(res: &LintResult, color: bool) -> String {
    let mut out = String::new();
    for report in res.files.iter().filter(|r| !r.findings.is_empty()) {
        render_file(report, color, &mut out);
    }
    out
}

fn render_file(report: &FileReport, color: bool, out: &mut String) {
    out.push_str(&format!("# {}\n", report.file));
    for f in &report.findings {
        let level = match (f.level, color) {
            (Level::Warning, true) => f.level.as_str().yellow().to_string(),
            (Level::Error, true) => f.level.as_str().red().to_string(),
            (_, false) => f.level.as_str().to_string(),
        };
        out.push_str(&format!("  - {} {}\n", level, f.description));
    }
    out.push('\n');
}

/// Compose lint JSON object (pure) for testing/snapshot purposes.
pub fn compose_lint_json(res: &LintResult) -> JsonVal {
    let files: Vec<_> = res
        .files
        .iter()
        .map(|r| {
            json!({
                "file": r.file,
                "severity": r.severity,
                "findings": r.findings,
            })
        })
        .collect();
    json!({
        "files": files,
        "summary": {
            "errors": res.summary.errors,
            "warnings": res.summary.warnings,
            "files": res.summary.files,
            "severity": res.severity,
        }
    })
}
