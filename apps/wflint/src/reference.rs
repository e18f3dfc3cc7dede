//! Parsing of `uses:` action references.
//!
//! A reference looks like `owner/repo[/subpath]@revision`. Parsing never
//! fails: malformed input degrades to a best-effort split and the rule
//! engine turns the defect into a finding.

use regex::Regex;
use std::sync::OnceLock;

/// Marker that identifies a same-repository (local) action or workflow.
pub const LOCAL_MARKER: &str = "./";

/// Length of a full commit hash.
pub const REVISION_LEN: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Classified action reference.
pub enum ActionRef {
    /// Local inclusion (`./path/to/action`); never looked up remotely.
    Local { raw: String },
    /// No `@` separator, so no pinned revision at all.
    Unpinned { raw: String },
    /// Remote reference split into its parts.
    Remote(RemoteAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAction {
    pub raw: String,
    pub owner: String,
    pub repo: Option<String>,
    pub subpath: Option<String>,
    pub revision: String,
}

impl RemoteAction {
    /// Number of non-empty path segments, capped at three
    /// (`owner`, `repo`, `subpath`).
    pub fn segment_count(&self) -> usize {
        1 + usize::from(self.repo.is_some()) + usize::from(self.subpath.is_some())
    }

    /// True when `owner` matches the internal namespace (ASCII case-insensitive).
    pub fn is_internal(&self, namespace: &str) -> bool {
        !namespace.is_empty() && self.owner.eq_ignore_ascii_case(namespace)
    }

    /// `owner/repo`, when a repository segment is present.
    pub fn repository(&self) -> Option<String> {
        self.repo.as_ref().map(|r| format!("{}/{}", self.owner, r))
    }

    pub fn has_valid_revision_length(&self) -> bool {
        self.revision.chars().count() == REVISION_LEN
    }

    /// Lowercase hexadecimal only; an empty revision is not hexadecimal.
    pub fn has_hex_revision(&self) -> bool {
        static HEX: OnceLock<Regex> = OnceLock::new();
        HEX.get_or_init(|| Regex::new(r"^[0-9a-f]+$").expect("static regex"))
            .is_match(&self.revision)
    }
}

/// Split a reference on its last `@` and classify it.
pub fn parse(raw: &str) -> ActionRef {
    let raw_owned = raw.to_string();
    if raw.contains(LOCAL_MARKER) {
        return ActionRef::Local { raw: raw_owned };
    }
    let Some((path, revision)) = raw.rsplit_once('@') else {
        return ActionRef::Unpinned { raw: raw_owned };
    };
    let mut segments = path.splitn(3, '/');
    let owner = segments.next().unwrap_or_default().to_string();
    let mut next_non_empty = || {
        segments
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let repo = next_non_empty();
    let subpath = next_non_empty();
    ActionRef::Remote(RemoteAction {
        raw: raw_owned,
        owner,
        repo,
        subpath,
        revision: revision.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(raw: &str) -> RemoteAction {
        match parse(raw) {
            ActionRef::Remote(r) => r,
            other => panic!("expected remote, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_internal_subpath_reference() {
        let r = remote("bitwarden/gh-actions/version-bump@03ad9a873c39cdc95dd8d77dbbda67f84db43945");
        assert_eq!(r.owner, "bitwarden");
        assert_eq!(r.repo.as_deref(), Some("gh-actions"));
        assert_eq!(r.subpath.as_deref(), Some("version-bump"));
        assert_eq!(r.segment_count(), 3);
        assert!(r.is_internal("bitwarden"));
        assert!(r.has_valid_revision_length());
        assert!(r.has_hex_revision());
    }

    #[test]
    fn test_subpath_keeps_remaining_slashes() {
        let r = remote("github/codeql-action/init/sub@v2");
        assert_eq!(r.subpath.as_deref(), Some("init/sub"));
        assert_eq!(r.repository().as_deref(), Some("github/codeql-action"));
    }

    #[test]
    fn test_local_marker_wins_over_everything() {
        assert!(matches!(
            parse("./local/workflow.yml@anything"),
            ActionRef::Local { .. }
        ));
        assert!(matches!(
            parse("./.github/actions/setup"),
            ActionRef::Local { .. }
        ));
    }

    #[test]
    fn test_missing_at_is_unpinned() {
        assert_eq!(
            parse("someorg/someaction"),
            ActionRef::Unpinned {
                raw: "someorg/someaction".into()
            }
        );
    }

    #[test]
    fn test_split_uses_last_at() {
        let r = remote("owner/repo@feature@abc");
        assert_eq!(r.repo.as_deref(), Some("repo@feature"));
        assert_eq!(r.revision, "abc");
    }

    #[test]
    fn test_short_and_empty_paths_degrade() {
        let r = remote("someaction@abc");
        assert_eq!(r.segment_count(), 1);
        assert!(r.repository().is_none());
        let r = remote("owner/@0000000000000000000000000000000000000000");
        assert_eq!(r.segment_count(), 1);
    }

    #[test]
    fn test_revision_checks_are_independent() {
        let r = remote("someorg/someaction@xyz");
        assert!(!r.has_valid_revision_length());
        assert!(!r.has_hex_revision());
        let r = remote("someorg/someaction@abc");
        assert!(!r.has_valid_revision_length());
        assert!(r.has_hex_revision());
        let r = remote("someorg/someaction@03AD9A873C39CDC95DD8D77DBBDA67F84DB43945");
        assert!(r.has_valid_revision_length());
        assert!(!r.has_hex_revision());
        let r = remote("someorg/someaction@");
        assert!(!r.has_hex_revision());
    }
}
