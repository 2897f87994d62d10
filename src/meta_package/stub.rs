//! Line-oriented reduction of Python sources to re-export stubs.
//!
//! This is pattern matching over raw lines, not parsing: multi-line
//! signatures, decorators and statements sharing a line are not understood.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::config::MetaPackageConfig;

/// Simple top-level assignment: `name = ...` starting at column 0
static TOP_LEVEL_ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\w+_]+) =").expect("valid regex"));

const DEFINITION_KEYWORDS: [&str; 2] = ["def", "class"];

pub struct StubContext<'a> {
    /// Basename of the source package, e.g. `lightning_app`
    pub pkg_name: &'a str,
    /// Dotted name of the generated package, e.g. `lightning.app`
    pub new_pkg: &'a str,
    /// Dotted path the generated imports point at
    pub import_path: &'a str,
    pub config: &'a MetaPackageConfig,
}

pub fn import_line(import_path: &str, name: &str) -> String {
    format!("from {import_path} import {name}  # noqa: F401")
}

/// Drop everything from the first `#` and any trailing whitespace.
fn strip_comment(line: &str) -> &str {
    let code = match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    };
    code.trim_end()
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn assigned_name(line: &str) -> Option<&str> {
    TOP_LEVEL_ASSIGNMENT
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Module names containing a hyphen cannot be imported.
fn imports_hyphenated(line: &str) -> bool {
    line.contains("import ") && line.contains('-')
}

/// Rewrite an `__init__.py`/`__main__.py` for the generated package.
///
/// Kept assignments become imports from the original package, everything
/// else is passed through with the package name swapped.
pub fn entry_stub(content: &str, ctx: &StubContext<'_>) -> Vec<String> {
    let mut body = Vec::new();
    for raw in content.lines() {
        let ln = strip_comment(raw);
        if let Some(name) = assigned_name(ln) {
            if !ctx.config.is_kept(name) {
                continue;
            }
            if name.starts_with("__") && name != "__all__" {
                continue;
            }
            body.push(import_line(ctx.import_path, name));
        } else if imports_hyphenated(ln) {
            continue;
        } else if !ctx.config.version_marker.is_empty() && ln.contains(&ctx.config.version_marker) {
            continue;
        } else {
            body.push(ln.replace(ctx.pkg_name, ctx.new_pkg));
        }
    }
    body
}

/// Reduce a regular module to imports of its kept assignments and its
/// definitions, eliding definition bodies by indentation.
pub fn module_stub(content: &str, ctx: &StubContext<'_>) -> Vec<String> {
    let mut body = Vec::new();
    if ctx.import_path.contains('-') {
        return body;
    }

    // 0 means no body is being skipped
    let mut skip_offset = 0;
    for raw in content.lines() {
        let ln = strip_comment(raw);
        if skip_offset > 0 && !ln.is_empty() {
            let offset = indentation(ln);
            if offset >= skip_offset {
                continue;
            }
            skip_offset = offset;
        }

        if let Some(name) = assigned_name(ln) {
            if !ctx.config.is_kept(name) {
                continue;
            }
            body.push(import_line(ctx.import_path, name));
        }
        if imports_hyphenated(ln) {
            continue;
        }

        let stripped = ln.trim_start();
        if !DEFINITION_KEYWORDS.iter().any(|k| stripped.starts_with(*k)) {
            continue;
        }
        let defined = ln.replace("def ", "").replace("class ", "");
        let defined = defined.trim();
        if ctx.config.is_excluded_name(defined) {
            trace!("Excluded definition: {}", defined);
            continue;
        }
        let end = defined
            .find(|c: char| matches!(c, '(' | ')' | ':'))
            .unwrap_or(defined.len());
        let name = &defined[..end];
        // dunder names are private; `=` means the line was not a definition after all
        if name.starts_with("__") || name.contains('=') {
            trace!("Skipping extracted name: {}", name);
            continue;
        }
        body.push(import_line(ctx.import_path, name));
        skip_offset = indentation(ln) + ctx.config.indent_width;
    }
    body
}
