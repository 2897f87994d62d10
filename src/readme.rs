//! README rewriting for release descriptions
//!
//! Pins badge and documentation links to a concrete release and drops the
//! section that is only meant for the repository landing page.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

use crate::config::ReadmeConfig;
use crate::error;

const STATIC_ASSETS: &str = "docs/source/_static/";
const SKIP_BEGIN: &str = "<!-- following section will be skipped from PyPI description -->";
const SKIP_END: &str = "<!-- end skipping PyPI description -->";
const SKIP_PLACEHOLDER: &str = "<!--  -->";

static PYPI_SKIPPED_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        "(?is){}.+?{}",
        regex::escape(SKIP_BEGIN),
        regex::escape(SKIP_END)
    ))
    .expect("valid regex")
});

/// Read the README from `path_dir` and rewrite it for release `ver`.
pub fn load_readme_description(path_dir: &Path, homepage: &str, ver: &str) -> Result<String> {
    load_readme_description_with(path_dir, homepage, ver, &ReadmeConfig::default())
}

pub fn load_readme_description_with(
    path_dir: &Path,
    homepage: &str,
    ver: &str,
    config: &ReadmeConfig,
) -> Result<String> {
    let path = path_dir.join(&config.file_name);
    let text = error::read_to_string(path.clone())?;
    debug!("Rewriting {} for release {}", path.display(), ver);
    Ok(rewrite_description_with(&text, homepage, ver, &config.docs_host))
}

/// Apply the release substitutions using the default documentation host.
pub fn rewrite_description(text: &str, homepage: &str, ver: &str) -> String {
    rewrite_description_with(text, homepage, ver, &ReadmeConfig::default().docs_host)
}

pub fn rewrite_description_with(text: &str, homepage: &str, ver: &str, docs_host: &str) -> String {
    // e.g. https://github.com/Lightning-AI/lightning/raw/1.8.0/docs/source/_static/...
    let release_url = join_url(homepage, &["raw", ver]);
    let text = pin_static_assets(text, &release_url);

    // readthedocs badge
    let text = text.replace("badge/?version=stable", &format!("badge/?version={ver}"));
    let text = text.replace(
        &format!("{docs_host}/en/stable/"),
        &format!("{docs_host}/en/{ver}/"),
    );
    // codecov badge
    let text = text.replace(
        "/branch/master/graph/badge.svg",
        &format!("/release/{ver}/graph/badge.svg"),
    );
    // CI badges
    let text = text.replace(
        "badge.svg?branch=master&event=push",
        &format!("badge.svg?tag={ver}"),
    );

    PYPI_SKIPPED_SECTION
        .replace_all(&text, SKIP_PLACEHOLDER)
        .into_owned()
}

/// Rewrite relative static-asset paths into absolute release links.
///
/// Only relative occurrences are touched, so links that already point at the
/// release stay as they are.
fn pin_static_assets(text: &str, release_url: &str) -> String {
    let pinned = join_url(release_url, &[STATIC_ASSETS]);
    let already = &pinned[..pinned.len() - STATIC_ASSETS.len()];

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (idx, _) in text.match_indices(STATIC_ASSETS) {
        out.push_str(&text[last..idx]);
        if text[..idx].ends_with(already) {
            out.push_str(STATIC_ASSETS);
        } else {
            out.push_str(&pinned);
        }
        last = idx + STATIC_ASSETS.len();
    }
    out.push_str(&text[last..]);
    out
}

/// Join path segments onto a URL without doubling separators.
fn join_url(base: &str, parts: &[&str]) -> String {
    let mut url = base.to_string();
    for part in parts {
        if !url.is_empty() && !url.ends_with('/') {
            url.push('/');
        }
        url.push_str(part);
    }
    url
}
