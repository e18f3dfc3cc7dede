//! Configuration discovery and effective settings resolution.
//!
//! wflint reads `wflint.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `output`: `human`
//! - `strict`: false
//! - `rules.internal_namespace`: `bitwarden`
//! - `rules.floating_runner_marker`: `-latest`
//! - `registry.api_url` / `registry.web_url`: GitHub
//! - `registry.timeout_secs`: 10
//! - `registry.token_env`: `GITHUB_TOKEN`
//! - `registry.offline`: false
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::checks::RuleSettings;
use crate::registry::{RegistrySettings, DEFAULT_API_URL, DEFAULT_WEB_URL};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILES: [&str; 3] = ["wflint.toml", "wflint.yaml", "wflint.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Rule tuning under `[rules]`.
pub struct RulesCfg {
    pub internal_namespace: Option<String>,
    pub floating_runner_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Registry access under `[registry]`.
pub struct RegistryCfg {
    pub api_url: Option<String>,
    pub web_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub token_env: Option<String>,
    pub offline: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `wflint.toml|yaml`.
pub struct WflintConfig {
    pub output: Option<String>,
    pub strict: Option<bool>,
    #[serde(default)]
    pub rules: Option<RulesCfg>,
    #[serde(default)]
    pub registry: Option<RegistryCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by the lint command.
pub struct Effective {
    pub repo_root: PathBuf,
    pub output: String,
    pub strict: bool,
    pub offline: bool,
    pub timeout: Duration,
    pub token_env: String,
    pub rules: RuleSettings,
    pub registry: RegistrySettings,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `wflint.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `WflintConfig` from the first config file present in `root`.
///
/// A file that fails to parse is skipped with a warning.
pub fn load_config(root: &Path) -> Option<WflintConfig> {
    for name in CONFIG_FILES {
        let p = root.join(name);
        if !p.exists() {
            continue;
        }
        let s = match fs::read_to_string(&p) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(path = %p.display(), error = %e, "cannot read config");
                return None;
            }
        };
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<WflintConfig>(&s).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<WflintConfig>(&s).map_err(|e| e.to_string())
        };
        return match parsed {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                tracing::warn!(path = %p.display(), error = %e, "ignoring invalid config");
                None
            }
        };
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_output: Option<&str>,
    cli_strict: Option<bool>,
    cli_offline: Option<bool>,
) -> Effective {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root).unwrap_or_default();
    let rules_cfg = cfg.rules.unwrap_or_default();
    let reg_cfg = cfg.registry.unwrap_or_default();

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    let strict = cli_strict.or(cfg.strict).unwrap_or(false);
    let offline = cli_offline.or(reg_cfg.offline).unwrap_or(false);

    let defaults = RuleSettings::default();
    let rules = RuleSettings {
        internal_namespace: rules_cfg
            .internal_namespace
            .unwrap_or(defaults.internal_namespace),
        floating_runner_marker: rules_cfg
            .floating_runner_marker
            .unwrap_or(defaults.floating_runner_marker),
    };
    let registry = RegistrySettings {
        api_url: reg_cfg.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        web_url: reg_cfg.web_url.unwrap_or_else(|| DEFAULT_WEB_URL.to_string()),
        internal_namespace: rules.internal_namespace.clone(),
    };

    Effective {
        repo_root,
        output,
        strict,
        offline,
        timeout: Duration::from_secs(reg_cfg.timeout_secs.unwrap_or(10)),
        token_env: reg_cfg
            .token_env
            .unwrap_or_else(|| "GITHUB_TOKEN".to_string()),
        rules,
        registry,
    }
}
