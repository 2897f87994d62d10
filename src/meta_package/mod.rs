//! Meta-package generation
//!
//! Mirrors a Python package into a new namespace where every module is a thin
//! stub re-exporting names from the original package. Entry files are carried
//! over with the package name rewritten and also placed in the top-level
//! package directory.

pub mod source;
pub mod stub;

use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::MetaPackageConfig;
use crate::error;
use source::{FileKind, SourceFile};
use stub::StubContext;

/// What a generation run produced, relative paths unless noted.
#[derive(Debug, Clone, Default)]
pub struct MetaPackageReport {
    pub written: Vec<PathBuf>,
    /// Private modules left out of the meta-package
    pub skipped: Vec<PathBuf>,
    /// Absolute destinations of copied entry files
    pub entry_copies: BTreeSet<PathBuf>,
}

/// Generate stubs for `package_dir` under `folder/<new_pkg as path>/`.
pub fn create_meta_package(
    package_dir: &Path,
    folder: &Path,
    new_pkg: &str,
    config: &MetaPackageConfig,
) -> Result<MetaPackageReport> {
    let package_dir = source::normalize_package_dir(package_dir)?;
    let package_dir = package_dir.as_path();
    let Some(pkg_name) = package_dir.file_name().and_then(|n| n.to_str()) else {
        bail!("Cannot determine package name of {}", package_dir.display());
    };
    let mut segments = new_pkg.split('.').filter(|s| !s.is_empty());
    let Some(top_level) = segments.next() else {
        bail!("Invalid package name: {:?}", new_pkg);
    };
    let top_pkg_dir = folder.join(top_level);
    let new_pkg_dir = segments.fold(top_pkg_dir.clone(), |dir, s| dir.join(s));

    info!(
        "Generating {} from {} into {}",
        new_pkg,
        package_dir.display(),
        new_pkg_dir.display()
    );

    let mut report = MetaPackageReport::default();
    for file in source::discover(package_dir, config)? {
        let body = match build_stub(&file, pkg_name, new_pkg, config)? {
            Some(body) => body,
            None => {
                warn!("unsupported file: {}", file.relative.display());
                report.skipped.push(file.relative);
                continue;
            }
        };

        let new_file = new_pkg_dir.join(&file.relative);
        write_lines(&new_file, &body)?;
        debug!("Wrote {} ({} lines)", new_file.display(), body.len());
        report.written.push(file.relative);

        copy_entry_files(&new_pkg_dir, &top_pkg_dir, config, &mut report)?;
    }

    info!(
        "Meta-package {}: {} file(s) written, {} skipped",
        new_pkg,
        report.written.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Stub lines for one file, or `None` when the file is private.
fn build_stub(
    file: &SourceFile,
    pkg_name: &str,
    new_pkg: &str,
    config: &MetaPackageConfig,
) -> Result<Option<Vec<String>>> {
    if file.is_private() {
        return Ok(None);
    }
    let content = error::read_to_string(file.path.clone())?;

    let body = match file.kind {
        FileKind::Entry => {
            let import_path = file.package_import_path(pkg_name);
            let ctx = StubContext {
                pkg_name,
                new_pkg,
                import_path: &import_path,
                config,
            };
            stub::entry_stub(&content, &ctx)
        }
        FileKind::Module => {
            let import_path = file.module_import_path(pkg_name);
            let ctx = StubContext {
                pkg_name,
                new_pkg,
                import_path: &import_path,
                config,
            };
            stub::module_stub(&content, &ctx)
        }
    };
    Ok(Some(body))
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

/// Copy entry files sitting directly in `new_pkg_dir` into `top_pkg_dir`.
fn copy_entry_files(
    new_pkg_dir: &Path,
    top_pkg_dir: &Path,
    config: &MetaPackageConfig,
    report: &mut MetaPackageReport,
) -> Result<()> {
    if new_pkg_dir == top_pkg_dir || !new_pkg_dir.is_dir() {
        return Ok(());
    }
    let entries = fs::read_dir(new_pkg_dir)
        .with_context(|| format!("Failed to list {}", new_pkg_dir.display()))?;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !config.is_entry_file(name) {
            continue;
        }
        let dest = top_pkg_dir.join(name);
        fs::copy(&path, &dest).with_context(|| {
            format!("Failed to copy {} to {}", path.display(), dest.display())
        })?;
        report.entry_copies.insert(dest);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_generates_mirrored_stubs() {
        let tmp = TempDir::new().unwrap();
        let pkg = tmp.path().join("src").join("lightning_app");
        write(&pkg, "__init__.py", "from lightning_app.core import LightningApp\n");
        write(&pkg, "core/__init__.py", "");
        write(
            &pkg,
            "core/app.py",
            "class LightningApp:\n    def __init__(self):\n        self.x = 1\n",
        );
        let out = tmp.path().join("out");

        let report =
            create_meta_package(&pkg, &out, "lightning.app", &MetaPackageConfig::default())
                .unwrap();
        assert_eq!(report.written.len(), 3);
        assert!(report.skipped.is_empty());

        let app = fs::read_to_string(out.join("lightning/app/core/app.py")).unwrap();
        assert_eq!(
            app,
            "from lightning_app.core.app import LightningApp  # noqa: F401\n"
        );
        let init = fs::read_to_string(out.join("lightning/app/__init__.py")).unwrap();
        assert_eq!(init, "from lightning.app.core import LightningApp\n");
        // entry file duplicated into the top-level package
        let top = fs::read_to_string(out.join("lightning/__init__.py")).unwrap();
        assert_eq!(top, init);
        assert!(report.entry_copies.contains(&out.join("lightning/__init__.py")));
    }

    #[test]
    fn test_private_module_skipped() {
        let tmp = TempDir::new().unwrap();
        let pkg = tmp.path().join("lightning_app");
        write(&pkg, "utilities/_cloud.py", "def login():\n    pass\n");
        let out = tmp.path().join("out");

        let report =
            create_meta_package(&pkg, &out, "lightning.app", &MetaPackageConfig::default())
                .unwrap();
        assert_eq!(report.skipped, vec![PathBuf::from("utilities/_cloud.py")]);
        assert!(report.written.is_empty());
        assert!(!out.join("lightning/app/utilities/_cloud.py").exists());
    }

    #[test]
    fn test_single_segment_package_does_not_copy_onto_itself() {
        let tmp = TempDir::new().unwrap();
        let pkg = tmp.path().join("orig");
        write(&pkg, "__init__.py", "import os\n");
        let out = tmp.path().join("out");

        let report =
            create_meta_package(&pkg, &out, "mirror", &MetaPackageConfig::default()).unwrap();
        assert!(report.entry_copies.is_empty());
        assert_eq!(
            fs::read_to_string(out.join("mirror/__init__.py")).unwrap(),
            "import os\n"
        );
    }

    #[test]
    fn test_invalid_new_pkg() {
        let tmp = TempDir::new().unwrap();
        let pkg = tmp.path().join("orig");
        fs::create_dir_all(&pkg).unwrap();
        let result = create_meta_package(&pkg, tmp.path(), "..", &MetaPackageConfig::default());
        assert!(result.is_err());
    }
}
