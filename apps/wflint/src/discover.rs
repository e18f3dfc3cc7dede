//! Input expansion into a sorted, de-duplicated list of workflow files.

use glob::glob;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const WORKFLOW_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Expand CLI inputs. Each input may hold several whitespace-separated
/// tokens; a token is a file, a directory (searched recursively for
/// `.yml`/`.yaml`), or a glob pattern.
pub fn workflow_files<S: AsRef<str>>(inputs: &[S]) -> Vec<PathBuf> {
    let mut out: BTreeSet<PathBuf> = BTreeSet::new();
    for token in inputs.iter().flat_map(|s| s.as_ref().split_whitespace()) {
        let path = Path::new(token);
        if path.is_file() {
            out.insert(path.to_path_buf());
        } else if path.is_dir() {
            for ext in WORKFLOW_EXTENSIONS {
                let pattern = path.join("**").join(format!("*.{}", ext));
                collect_glob(&pattern.to_string_lossy(), &mut out);
            }
        } else {
            collect_glob(token, &mut out);
        }
    }
    out.into_iter().collect()
}

fn collect_glob(pattern: &str, out: &mut BTreeSet<PathBuf>) {
    match glob(pattern) {
        Ok(paths) => {
            for p in paths.flatten().filter(|p| p.is_file()) {
                out.insert(p);
            }
        }
        Err(e) => tracing::debug!(pattern, error = %e, "ignoring invalid glob pattern"),
    }
}
