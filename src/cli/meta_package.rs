use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::meta_package::create_meta_package;

pub fn run(
    package_dir: &str,
    folder: Option<String>,
    new_pkg: Option<String>,
    config: &Config,
) -> Result<()> {
    let package_dir = Path::new(package_dir);
    if !package_dir.is_dir() {
        bail!("Package directory not found: {}", package_dir.display());
    }
    let folder = match folder {
        Some(folder) => PathBuf::from(folder),
        None => default_folder(package_dir),
    };
    let new_pkg = new_pkg.unwrap_or_else(|| config.meta_package.new_pkg.clone());

    let report = create_meta_package(package_dir, &folder, &new_pkg, &config.meta_package)?;

    println!(
        "{}: {} stub(s) written, {} private file(s) skipped, {} entry file(s) copied",
        new_pkg,
        report.written.len(),
        report.skipped.len(),
        report.entry_copies.len()
    );
    Ok(())
}

/// The project root is the directory holding the package.
fn default_folder(package_dir: &Path) -> PathBuf {
    match package_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
