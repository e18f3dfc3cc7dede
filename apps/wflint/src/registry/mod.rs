//! Remote action registry lookups.
//!
//! Two questions are answered for a referenced action: does it exist, and
//! what is its newest commit. Internal actions (owner equal to the configured
//! namespace) live as sub-paths of a shared repository, so both answers come
//! from the commit history of that sub-path. External actions are resolved
//! through the repository metadata and its latest published release.
//!
//! Lookup failures never reach the rule engine. Anything other than an
//! explicit "not found" is treated as "exists", and any failure while
//! resolving the latest commit means "no update information".

pub mod http;

use crate::reference::{ActionRef, RemoteAction};
use reqwest::Url;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_WEB_URL: &str = "https://github.com";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Tagged outcome of a failed registry call.
pub enum TransportError {
    #[error("not found")]
    NotFound,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("unauthorized")]
    Unauthorized,
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Fetches a JSON document from a URL.
pub trait Transport: Send + Sync {
    fn get_json(&self, url: &str) -> Result<Json, TransportError>;
}

/// Existence and staleness lookups used by the rule engine.
pub trait ActionRegistry: Send + Sync {
    /// `false` only when the registry explicitly says the action is missing.
    fn exists(&self, action: &ActionRef) -> bool;

    /// Newest commit for the action, if it can be resolved.
    fn latest_revision(&self, action: &ActionRef) -> Option<String>;

    /// Human-followable link to a commit of the action's repository.
    fn commit_url(&self, action: &RemoteAction, sha: &str) -> String;

    /// Link to the newest commit when it differs from the pinned revision.
    fn update_url(&self, action: &ActionRef) -> Option<String> {
        let ActionRef::Remote(remote) = action else {
            return None;
        };
        let latest = self.latest_revision(action)?;
        if latest == remote.revision {
            None
        } else {
            Some(self.commit_url(remote, &latest))
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistrySettings {
    pub api_url: String,
    pub web_url: String,
    pub internal_namespace: String,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            web_url: DEFAULT_WEB_URL.to_string(),
            internal_namespace: "bitwarden".to_string(),
        }
    }
}

/// GitHub-backed registry with per-run memoization keyed by the raw reference.
pub struct GithubRegistry<T: Transport> {
    transport: T,
    settings: RegistrySettings,
    exists_cache: Mutex<HashMap<String, bool>>,
    latest_cache: Mutex<HashMap<String, Option<String>>>,
}

impl<T: Transport> GithubRegistry<T> {
    pub fn new(transport: T, settings: RegistrySettings) -> Self {
        Self {
            transport,
            settings,
            exists_cache: Mutex::new(HashMap::new()),
            latest_cache: Mutex::new(HashMap::new()),
        }
    }

    fn api(&self) -> &str {
        self.settings.api_url.trim_end_matches('/')
    }

    /// `{api}/repos/{owner}/{repo}/<extra...>` with every segment escaped.
    fn repo_endpoint<'a>(
        &self,
        action: &'a RemoteAction,
        extra: impl IntoIterator<Item = &'a str>,
    ) -> Option<Url> {
        let repo = action.repo.as_deref()?;
        let mut url = Url::parse(self.api()).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["repos", action.owner.as_str(), repo])
            .extend(extra);
        Some(url)
    }

    /// Sub-path history URL for internal actions that carry a sub-path.
    fn history_url(&self, action: &RemoteAction) -> Option<String> {
        if !action.is_internal(&self.settings.internal_namespace) {
            return None;
        }
        let subpath = action.subpath.as_deref()?;
        let mut url = self.repo_endpoint(action, ["commits"])?;
        url.query_pairs_mut().append_pair("path", subpath);
        Some(url.into())
    }

    fn fetch(&self, action: &RemoteAction, url: &str) -> Result<Json, TransportError> {
        tracing::debug!(action = %action.raw, url, "registry request");
        let res = self.transport.get_json(url);
        match &res {
            Ok(_) => {}
            Err(TransportError::NotFound) => {
                tracing::debug!(action = %action.raw, url, "registry returned not found");
            }
            Err(e) => {
                tracing::warn!(action = %action.raw, url, error = %e, "registry lookup failed");
            }
        }
        res
    }

    fn remote_exists(&self, action: &RemoteAction) -> bool {
        if let Some(url) = self.history_url(action) {
            return match self.fetch(action, &url) {
                Ok(Json::Array(history)) => !history.is_empty(),
                Ok(_) => true,
                Err(TransportError::NotFound) => false,
                Err(_) => true,
            };
        }
        let Some(url) = self.repo_endpoint(action, []) else {
            return true;
        };
        !matches!(
            self.fetch(action, url.as_str()),
            Err(TransportError::NotFound)
        )
    }

    fn remote_latest(&self, action: &RemoteAction) -> Option<String> {
        if let Some(url) = self.history_url(action) {
            let history = self.fetch(action, &url).ok()?;
            return history.get(0)?.get("sha")?.as_str().map(str::to_string);
        }
        let release_url = self.repo_endpoint(action, ["releases", "latest"])?;
        let release = self.fetch(action, release_url.as_str()).ok()?;
        let tag = release.get("tag_name")?.as_str()?;
        // Slashes in a tag name stay path separators, as the refs API expects.
        let ref_url =
            self.repo_endpoint(action, ["git", "ref", "tags"].into_iter().chain(tag.split('/')))?;
        let tag_ref = self.fetch(action, ref_url.as_str()).ok()?;
        let object = tag_ref.get("object")?;
        if object.get("type").and_then(Json::as_str) == Some("commit") {
            return object.get("sha")?.as_str().map(str::to_string);
        }
        // Annotated tag: follow the tag object to the commit it points at.
        let tag_url = object.get("url")?.as_str()?;
        let tag_object = self.fetch(action, tag_url).ok()?;
        tag_object
            .get("object")?
            .get("sha")?
            .as_str()
            .map(str::to_string)
    }
}

impl<T: Transport> ActionRegistry for GithubRegistry<T> {
    fn exists(&self, action: &ActionRef) -> bool {
        let ActionRef::Remote(remote) = action else {
            return true;
        };
        if let Some(hit) = self
            .exists_cache
            .lock()
            .ok()
            .and_then(|c| c.get(&remote.raw).copied())
        {
            return hit;
        }
        let found = self.remote_exists(remote);
        if let Ok(mut cache) = self.exists_cache.lock() {
            cache.insert(remote.raw.clone(), found);
        }
        found
    }

    fn latest_revision(&self, action: &ActionRef) -> Option<String> {
        let ActionRef::Remote(remote) = action else {
            return None;
        };
        if let Some(hit) = self
            .latest_cache
            .lock()
            .ok()
            .and_then(|c| c.get(&remote.raw).cloned())
        {
            return hit;
        }
        let latest = self.remote_latest(remote);
        if let Ok(mut cache) = self.latest_cache.lock() {
            cache.insert(remote.raw.clone(), latest.clone());
        }
        latest
    }

    fn commit_url(&self, action: &RemoteAction, sha: &str) -> String {
        let repo = action
            .repository()
            .unwrap_or_else(|| action.owner.clone());
        format!(
            "{}/{}/commit/{}",
            self.settings.web_url.trim_end_matches('/'),
            repo,
            sha
        )
    }
}

/// Registry used with `--offline`: everything exists and nothing is stale.
pub struct OfflineRegistry;

impl ActionRegistry for OfflineRegistry {
    fn exists(&self, _action: &ActionRef) -> bool {
        true
    }

    fn latest_revision(&self, _action: &ActionRef) -> Option<String> {
        None
    }

    fn commit_url(&self, action: &RemoteAction, sha: &str) -> String {
        let repo = action
            .repository()
            .unwrap_or_else(|| action.owner.clone());
        format!("{}/{}/commit/{}", DEFAULT_WEB_URL, repo, sha)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeTransport;
    use super::*;
    use crate::reference::parse;
    use serde_json::json;

    const PINNED: &str = "03ad9a873c39cdc95dd8d77dbbda67f84db43945";
    const NEWER: &str = "1111111111111111111111111111111111111111";
    const INTERNAL_HISTORY: &str =
        "https://api.github.com/repos/bitwarden/gh-actions/commits?path=version-bump";

    fn registry(t: FakeTransport) -> GithubRegistry<FakeTransport> {
        GithubRegistry::new(t, RegistrySettings::default())
    }

    #[test]
    fn test_local_reference_makes_no_calls() {
        let reg = registry(FakeTransport::new());
        let action = parse("./local/workflow.yml@anything");
        assert!(reg.exists(&action));
        assert_eq!(reg.update_url(&action), None);
        assert_eq!(reg.transport().calls(), 0);
    }

    #[test]
    fn test_internal_exists_and_update_from_history() {
        let t = FakeTransport::new().route(
            INTERNAL_HISTORY,
            Ok(json!([{ "sha": NEWER }, { "sha": PINNED }])),
        );
        let reg = registry(t);
        let action = parse(&format!("bitwarden/gh-actions/version-bump@{PINNED}"));
        assert!(reg.exists(&action));
        assert_eq!(
            reg.update_url(&action).as_deref(),
            Some(format!("https://github.com/bitwarden/gh-actions/commit/{NEWER}").as_str())
        );
    }

    #[test]
    fn test_internal_up_to_date_reports_nothing() {
        let t = FakeTransport::new().route(INTERNAL_HISTORY, Ok(json!([{ "sha": PINNED }])));
        let reg = registry(t);
        let action = parse(&format!("bitwarden/gh-actions/version-bump@{PINNED}"));
        assert_eq!(reg.update_url(&action), None);
    }

    #[test]
    fn test_internal_missing_path() {
        let missing = registry(FakeTransport::new());
        let action = parse(&format!("bitwarden/gh-actions/version-bump@{PINNED}"));
        assert!(!missing.exists(&action));

        let empty = registry(FakeTransport::new().route(INTERNAL_HISTORY, Ok(json!([]))));
        assert!(!empty.exists(&action));
        assert_eq!(empty.latest_revision(&action), None);
    }

    #[test]
    fn test_failures_degrade_to_exists_and_no_update() {
        for err in [
            TransportError::RateLimited,
            TransportError::Unauthorized,
            TransportError::Status(502),
            TransportError::Network("timed out".into()),
        ] {
            let t = FakeTransport::new()
                .route(INTERNAL_HISTORY, Err(err.clone()))
                .route("https://api.github.com/repos/actions/checkout", Err(err.clone()))
                .route(
                    "https://api.github.com/repos/actions/checkout/releases/latest",
                    Err(err),
                );
            let reg = registry(t);
            let internal = parse(&format!("bitwarden/gh-actions/version-bump@{PINNED}"));
            let external = parse(&format!("actions/checkout@{PINNED}"));
            assert!(reg.exists(&internal));
            assert!(reg.exists(&external));
            assert_eq!(reg.update_url(&internal), None);
            assert_eq!(reg.update_url(&external), None);
        }
    }

    #[test]
    fn test_external_not_found() {
        let reg = registry(FakeTransport::new());
        assert!(!reg.exists(&parse(&format!("nobody/nothing@{PINNED}"))));
    }

    #[test]
    fn test_external_lightweight_tag() {
        let t = FakeTransport::new()
            .route(
                "https://api.github.com/repos/actions/checkout/releases/latest",
                Ok(json!({ "tag_name": "v4.1.1" })),
            )
            .route(
                "https://api.github.com/repos/actions/checkout/git/ref/tags/v4.1.1",
                Ok(json!({ "object": { "type": "commit", "sha": NEWER } })),
            );
        let reg = registry(t);
        let action = parse(&format!("actions/checkout@{PINNED}"));
        assert_eq!(reg.latest_revision(&action).as_deref(), Some(NEWER));
        assert_eq!(
            reg.update_url(&action).as_deref(),
            Some(format!("https://github.com/actions/checkout/commit/{NEWER}").as_str())
        );
    }

    #[test]
    fn test_external_annotated_tag_is_dereferenced() {
        let tag_url = "https://api.github.com/repos/actions/cache/git/tags/abc";
        let t = FakeTransport::new()
            .route(
                "https://api.github.com/repos/actions/cache/releases/latest",
                Ok(json!({ "tag_name": "v4" })),
            )
            .route(
                "https://api.github.com/repos/actions/cache/git/ref/tags/v4",
                Ok(json!({ "object": { "type": "tag", "sha": "abc", "url": tag_url } })),
            )
            .route(tag_url, Ok(json!({ "object": { "type": "commit", "sha": PINNED } })));
        let reg = registry(t);
        let action = parse(&format!("actions/cache/save@{PINNED}"));
        assert_eq!(reg.latest_revision(&action).as_deref(), Some(PINNED));
        assert_eq!(reg.update_url(&action), None);
    }

    #[test]
    fn test_tag_names_are_escaped_in_ref_url() {
        let t = FakeTransport::new()
            .route(
                "https://api.github.com/repos/actions/checkout/releases/latest",
                Ok(json!({ "tag_name": "v1#rc?1" })),
            )
            .route(
                "https://api.github.com/repos/actions/checkout/git/ref/tags/v1%23rc%3F1",
                Ok(json!({ "object": { "type": "commit", "sha": NEWER } })),
            );
        let reg = registry(t);
        let action = parse(&format!("actions/checkout@{PINNED}"));
        assert_eq!(reg.latest_revision(&action).as_deref(), Some(NEWER));

        let t = FakeTransport::new()
            .route(
                "https://api.github.com/repos/actions/setup-node/releases/latest",
                Ok(json!({ "tag_name": "release/v2" })),
            )
            .route(
                "https://api.github.com/repos/actions/setup-node/git/ref/tags/release/v2",
                Ok(json!({ "object": { "type": "commit", "sha": NEWER } })),
            );
        let reg = registry(t);
        let action = parse(&format!("actions/setup-node@{PINNED}"));
        assert_eq!(reg.latest_revision(&action).as_deref(), Some(NEWER));
    }

    #[test]
    fn test_api_base_with_path_prefix() {
        let settings = RegistrySettings {
            api_url: "https://ghe.example.com/api/v3/".into(),
            ..RegistrySettings::default()
        };
        let t = FakeTransport::new().route(
            "https://ghe.example.com/api/v3/repos/bitwarden/gh-actions/commits?path=version-bump",
            Ok(json!([{ "sha": PINNED }])),
        );
        let reg = GithubRegistry::new(t, settings);
        let action = parse(&format!("bitwarden/gh-actions/version-bump@{PINNED}"));
        assert!(reg.exists(&action));
        assert_eq!(reg.update_url(&action), None);
    }

    #[test]
    fn test_broken_chain_means_no_update() {
        let t = FakeTransport::new().route(
            "https://api.github.com/repos/actions/checkout/releases/latest",
            Ok(json!({ "name": "no tag here" })),
        );
        let reg = registry(t);
        assert_eq!(
            reg.latest_revision(&parse(&format!("actions/checkout@{PINNED}"))),
            None
        );
    }

    #[test]
    fn test_lookups_are_memoized_per_reference() {
        let t = FakeTransport::new()
            .route("https://api.github.com/repos/actions/checkout", Ok(json!({})));
        let reg = registry(t);
        let action = parse(&format!("actions/checkout@{PINNED}"));
        assert!(reg.exists(&action));
        assert!(reg.exists(&action));
        assert_eq!(reg.latest_revision(&action), None);
        assert_eq!(reg.latest_revision(&action), None);
        assert_eq!(reg.transport().calls(), 2);
    }

    #[test]
    fn test_offline_registry() {
        let action = parse(&format!("actions/checkout@{PINNED}"));
        assert!(OfflineRegistry.exists(&action));
        assert_eq!(OfflineRegistry.update_url(&action), None);
    }
}
