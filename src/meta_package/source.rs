use anyhow::{bail, Context, Result};
use glob::{glob_with, MatchOptions, Pattern};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::config::MetaPackageConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `__init__.py` / `__main__.py`: copied through with light rewriting
    Entry,
    /// Everything else: reduced to re-export stubs
    Module,
}

/// A Python file found under the package root.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the package root, e.g. `utilities/network.py`
    pub relative: PathBuf,
    pub file_name: String,
    pub kind: FileKind,
}

impl SourceFile {
    pub fn new(path: PathBuf, package_dir: &Path, config: &MetaPackageConfig) -> Result<Self> {
        let relative = match path.strip_prefix(package_dir) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => bail!(
                "{} is not inside {}",
                path.display(),
                package_dir.display()
            ),
        };
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();
        let kind = if config.is_entry_file(&file_name) {
            FileKind::Entry
        } else {
            FileKind::Module
        };
        Ok(Self {
            path,
            relative,
            file_name,
            kind,
        })
    }

    /// Private modules (`_internal.py`) are not re-exported
    pub fn is_private(&self) -> bool {
        self.kind == FileKind::Module && self.file_name.starts_with('_')
    }

    /// Dotted path of the package containing this file: `pkg.sub`
    pub fn package_import_path(&self, pkg_name: &str) -> String {
        let mut parts = vec![pkg_name.to_string()];
        if let Some(parent) = self.relative.parent() {
            parts.extend(component_names(parent));
        }
        parts.join(".")
    }

    /// Dotted path of the module itself: `pkg.sub.module`
    pub fn module_import_path(&self, pkg_name: &str) -> String {
        let mut parts = vec![pkg_name.to_string()];
        parts.extend(component_names(&self.relative.with_extension("")));
        parts.join(".")
    }
}

fn component_names(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| c.as_os_str().to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Bring a user-supplied package path into the form glob hands back.
///
/// `./` segments are dropped (glob strips them from its results). Paths
/// without a final name, such as `.` or `pkg/..`, are resolved on disk.
pub fn normalize_package_dir(package_dir: &Path) -> Result<PathBuf> {
    let cleaned: PathBuf = package_dir
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if cleaned.file_name().is_some() {
        return Ok(cleaned);
    }
    fs::canonicalize(package_dir)
        .with_context(|| format!("Failed to resolve package path {}", package_dir.display()))
}

/// Find all `*.py` files below `package_dir`, in sorted order.
///
/// Hidden entries are not matched and hyphenated file names are dropped,
/// since they cannot be imported.
pub fn discover(package_dir: &Path, config: &MetaPackageConfig) -> Result<Vec<SourceFile>> {
    let package_dir = normalize_package_dir(package_dir)?;
    let package_dir = package_dir.as_path();
    let Some(root) = package_dir.to_str() else {
        bail!("Package path is not valid UTF-8: {}", package_dir.display());
    };
    let pattern = format!("{}/**/*.py", Pattern::escape(root.trim_end_matches('/')));
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let mut files = Vec::new();
    for entry in glob_with(&pattern, options)? {
        let path = entry?;
        if !path.is_file() {
            continue;
        }
        let file = SourceFile::new(path, package_dir, config)?;
        if file.file_name.contains('-') {
            debug!("Skipping non-importable file: {}", file.relative.display());
            continue;
        }
        files.push(file);
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    debug!("Found {} Python files under {}", files.len(), package_dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_discover_recurses_and_filters() {
        let tmp = TempDir::new().unwrap();
        let pkg = tmp.path().join("lightning_app");
        touch(&pkg, "__init__.py");
        touch(&pkg, "core/app.py");
        touch(&pkg, "core/__init__.py");
        touch(&pkg, "cli/lightning-init.py");
        touch(&pkg, "notes.txt");
        touch(&pkg, ".hidden/secret.py");

        let files = discover(&pkg, &MetaPackageConfig::default()).unwrap();
        let rels: Vec<_> = files
            .iter()
            .map(|f| f.relative.to_string_lossy().to_string())
            .collect();
        assert_eq!(rels, vec!["__init__.py", "core/__init__.py", "core/app.py"]);
    }

    #[test]
    fn test_classification() {
        let config = MetaPackageConfig::default();
        let pkg = Path::new("/src/lightning_app");
        let entry = SourceFile::new(pkg.join("__main__.py"), pkg, &config).unwrap();
        assert_eq!(entry.kind, FileKind::Entry);
        assert!(!entry.is_private());

        let private = SourceFile::new(pkg.join("utilities/_internal.py"), pkg, &config).unwrap();
        assert_eq!(private.kind, FileKind::Module);
        assert!(private.is_private());

        let public = SourceFile::new(pkg.join("utilities/network.py"), pkg, &config).unwrap();
        assert!(!public.is_private());
    }

    #[test]
    fn test_import_paths() {
        let config = MetaPackageConfig::default();
        let pkg = Path::new("/src/lightning_app");
        let module = SourceFile::new(pkg.join("utilities/network.py"), pkg, &config).unwrap();
        assert_eq!(
            module.module_import_path("lightning_app"),
            "lightning_app.utilities.network"
        );
        assert_eq!(
            module.package_import_path("lightning_app"),
            "lightning_app.utilities"
        );

        let root_init = SourceFile::new(pkg.join("__init__.py"), pkg, &config).unwrap();
        assert_eq!(root_init.package_import_path("lightning_app"), "lightning_app");
    }

    #[test]
    fn test_normalize_drops_current_dir_segments() {
        assert_eq!(
            normalize_package_dir(Path::new("./src/./lightning_app")).unwrap(),
            PathBuf::from("src/lightning_app")
        );
        assert_eq!(
            normalize_package_dir(Path::new("lightning_app/")).unwrap(),
            PathBuf::from("lightning_app")
        );
        assert_eq!(
            normalize_package_dir(Path::new("../work/lightning_app")).unwrap(),
            PathBuf::from("../work/lightning_app")
        );
    }

    #[test]
    fn test_normalize_resolves_nameless_paths() {
        let tmp = TempDir::new().unwrap();
        let pkg = tmp.path().join("lightning_app");
        fs::create_dir_all(pkg.join("core")).unwrap();
        let resolved = normalize_package_dir(&pkg.join("core").join("..")).unwrap();
        assert_eq!(resolved, pkg.canonicalize().unwrap());
        assert_eq!(resolved.file_name().unwrap(), "lightning_app");
    }

    #[test]
    fn test_discover_with_dotted_prefix() {
        let tmp = TempDir::new().unwrap();
        let pkg = tmp.path().join("lightning_app");
        touch(&pkg, "core/app.py");
        // a `./` segment in the middle of the path must not break relative paths
        let dotted = tmp.path().join(".").join("lightning_app");
        let files = discover(&dotted, &MetaPackageConfig::default()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative, PathBuf::from("core/app.py"));
    }

    #[test]
    fn test_file_outside_package_rejected() {
        let config = MetaPackageConfig::default();
        let result = SourceFile::new(
            PathBuf::from("/elsewhere/x.py"),
            Path::new("/src/pkg"),
            &config,
        );
        assert!(result.is_err());
    }
}
