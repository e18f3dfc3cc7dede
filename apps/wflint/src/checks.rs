//! Workflow rule battery.
//!
//! Findings are produced in discovery order: workflow-level checks first,
//! then each job in document order, then each of its steps in order.
//! Every rule runs independently except inside a `uses:` check, where a
//! missing `@` stops the remaining reference checks for that step and a
//! bad path skips the registry lookups.

use crate::models::workflow::{Job, Step, WorkflowDocument};
use crate::models::Finding;
use crate::reference::{self, ActionRef, RemoteAction};
use crate::registry::ActionRegistry;

#[derive(Debug, Clone)]
pub struct RuleSettings {
    /// Owner namespace whose actions are addressed as `owner/repo/subpath`.
    pub internal_namespace: String,
    /// Substring of a runner label that marks an unpinned image.
    pub floating_runner_marker: String,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            internal_namespace: "bitwarden".to_string(),
            floating_runner_marker: "-latest".to_string(),
        }
    }
}

/// Evaluate every rule against one workflow document.
pub fn check_workflow(
    doc: &WorkflowDocument,
    settings: &RuleSettings,
    registry: &dyn ActionRegistry,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    match doc.name.as_deref() {
        None => findings.push(Finding::warning("Name key missing for workflow.")),
        Some(name) if !crate::utils::starts_uppercase(name) => findings.push(Finding::warning(
            format!("Name value for workflow is not capitalized. [{}]", name),
        )),
        Some(_) => {}
    }

    if let Some(jobs) = doc.jobs.as_ref() {
        for (job_key, job) in jobs.iter() {
            check_job(job_key, job, settings, registry, &mut findings);
        }
    }
    findings
}

fn check_job(
    job_key: &str,
    job: &Job,
    settings: &RuleSettings,
    registry: &dyn ActionRegistry,
    findings: &mut Vec<Finding>,
) {
    if let Some(runs_on) = job.runs_on.as_ref() {
        let marker = settings.floating_runner_marker.as_str();
        for label in runs_on.labels() {
            if !marker.is_empty() && label.contains(marker) {
                findings.push(Finding::warning(format!(
                    "Runner version is set to '{}', but needs to be pinned to a version.",
                    label
                )));
            }
        }
    }

    match job.name.as_deref() {
        None => findings.push(Finding::warning(format!(
            "Name key missing for job key '{}'.",
            job_key
        ))),
        Some(name) if !crate::utils::starts_uppercase(name) => {
            findings.push(Finding::warning(format!(
                "Name value of job key '{}' is not capitalized. [{}]",
                job_key, name
            )))
        }
        Some(_) => {}
    }

    if let Some(env) = job.env.as_ref() {
        for key in env.keys().filter(|k| !k.starts_with('_')) {
            findings.push(Finding::warning(format!(
                "Environment variable '{}' of job key '{}' does not start with an underscore.",
                key, job_key
            )));
        }
    }

    for (i, step) in job.steps.iter().enumerate() {
        check_step(job_key, i + 1, step, settings, registry, findings);
    }
}

fn check_step(
    job_key: &str,
    number: usize,
    step: &Step,
    settings: &RuleSettings,
    registry: &dyn ActionRegistry,
    findings: &mut Vec<Finding>,
) {
    match step.name.as_deref() {
        None => findings.push(Finding::warning(format!(
            "Name key missing for step {} of job key '{}'.",
            number, job_key
        ))),
        Some(name) if !crate::utils::starts_uppercase(name) => {
            findings.push(Finding::warning(format!(
                "Name value in step {} of job key '{}' is not capitalized. [{}]",
                number, job_key, name
            )))
        }
        Some(_) => {}
    }

    if let Some(uses) = step.uses.as_deref() {
        check_uses(job_key, number, uses, settings, registry, findings);
    }

    if let Some(run) = step.run.as_deref() {
        if run.matches('\n').count() == 1 {
            findings.push(Finding::warning(format!(
                "Run in step {} of job key '{}' should be a single line.",
                number, job_key
            )));
        }
    }
}

fn check_uses(
    job_key: &str,
    number: usize,
    uses: &str,
    settings: &RuleSettings,
    registry: &dyn ActionRegistry,
    findings: &mut Vec<Finding>,
) {
    let action = reference::parse(uses);
    let remote = match &action {
        ActionRef::Local { .. } => return,
        ActionRef::Unpinned { .. } => {
            findings.push(Finding::error(format!(
                "Step {} of job key '{}' does not have a valid action hash. (missing '@' character)",
                number, job_key
            )));
            return;
        }
        ActionRef::Remote(remote) => remote,
    };

    if !remote.has_valid_revision_length() {
        findings.push(Finding::error(format!(
            "Step {} of job key '{}' does not have a valid action hash. (not 40 characters)",
            number, job_key
        )));
    }
    if !remote.has_hex_revision() {
        findings.push(Finding::error(format!(
            "Step {} of job key '{}' does not have a valid action hash. (not all hexadecimal characters)",
            number, job_key
        )));
    }

    if let Some(problem) = path_problem(remote, &settings.internal_namespace) {
        findings.push(Finding::error(format!(
            "Step {} of job key '{}' does not have a valid action path. ({})",
            number, job_key, problem
        )));
        return;
    }

    if !registry.exists(&action) {
        findings.push(Finding::error(format!(
            "Step {} of job key '{}' uses a non-existing action: {}.",
            number, job_key, uses
        )));
    } else if let Some(url) = registry.update_url(&action) {
        findings.push(Finding::warning(format!(
            "Step {} of job key '{}' uses an outdated action, consider updating it '{}'.",
            number, job_key, url
        )));
    }
}

/// Internal actions need `owner/repo/subpath`, everything else `owner/repo`.
fn path_problem(action: &RemoteAction, internal_namespace: &str) -> Option<&'static str> {
    if action.is_internal(internal_namespace) {
        (action.segment_count() < 3).then_some("missing name of the repository or workflow")
    } else {
        (action.segment_count() < 2).then_some("missing workflow name or the workflow author")
    }
}
