//! Workflow document schema.
//!
//! Only the keys the rule engine inspects are modelled; everything else in
//! the YAML is ignored. Job and env maps keep document order because the
//! order of findings follows it.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value as Yaml;

#[derive(Debug, Default, Deserialize)]
/// Top-level workflow definition.
pub struct WorkflowDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub jobs: Option<IndexMap<String, Job>>,
}

#[derive(Debug, Default, Deserialize)]
/// A job entry under `jobs.<key>`.
pub struct Job {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "runs-on")]
    pub runs_on: Option<RunsOn>,
    #[serde(default)]
    pub env: Option<IndexMap<String, Yaml>>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Default, Deserialize)]
/// A single step of a job.
pub struct Step {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub uses: Option<String>,
    #[serde(default)]
    pub run: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
/// `runs-on` accepts a single label, a label list, or a runner-group mapping.
pub enum RunsOn {
    Label(String),
    Labels(Vec<String>),
    Other(Yaml),
}

impl RunsOn {
    /// Plain labels carried by this value. Group mappings yield nothing.
    pub fn labels(&self) -> Vec<&str> {
        match self {
            RunsOn::Label(l) => vec![l.as_str()],
            RunsOn::Labels(ls) => ls.iter().map(String::as_str).collect(),
            RunsOn::Other(_) => Vec::new(),
        }
    }
}
