//! Loading of pip-style requirement lists

use anyhow::Result;
use std::path::Path;
use tracing::debug;

use crate::error;

/// Read `path_dir/file_name` and return its requirement specifiers in file order.
///
/// Comments, blank lines, direct URL dependencies and `--extra-index-url`
/// directives are dropped. A missing file is an error.
pub fn load_requirements(path_dir: &Path, file_name: &str, comment_char: &str) -> Result<Vec<String>> {
    let path = path_dir.join(file_name);
    let content = error::read_to_string(path.clone())?;
    let reqs = parse_requirements(&content, comment_char);
    debug!("Loaded {} requirement(s) from {}", reqs.len(), path.display());
    Ok(reqs)
}

/// Filter requirement-file text down to its specifiers.
pub fn parse_requirements(content: &str, comment_char: &str) -> Vec<String> {
    let mut reqs = Vec::new();
    for line in content.lines() {
        let mut ln = line.trim();
        if !comment_char.is_empty() {
            if let Some(idx) = ln.find(comment_char) {
                ln = ln[..idx].trim();
            }
        }
        // directly installed dependencies
        if ln.starts_with("http") {
            continue;
        }
        if ln.starts_with("--extra-index-url") {
            continue;
        }
        if !ln.is_empty() {
            reqs.push(ln.to_string());
        }
    }
    reqs
}
