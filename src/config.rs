use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::SetupError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub requirements: RequirementsConfig,
    #[serde(default)]
    pub readme: ReadmeConfig,
    #[serde(default)]
    pub meta_package: MetaPackageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementsConfig {
    /// Requirements file looked up inside the given directory (default: "requirements.txt")
    #[serde(default = "default_requirements_file")]
    pub file_name: String,

    /// Everything from this marker to the end of the line is dropped (default: "#")
    #[serde(default = "default_comment_char")]
    pub comment_char: String,
}

impl Default for RequirementsConfig {
    fn default() -> Self {
        Self {
            file_name: default_requirements_file(),
            comment_char: default_comment_char(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadmeConfig {
    /// Document to rewrite (default: "README.md")
    #[serde(default = "default_readme_file")]
    pub file_name: String,

    /// Host whose `/en/stable/` docs links get pinned to the release
    #[serde(default = "default_docs_host")]
    pub docs_host: String,
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            file_name: default_readme_file(),
            docs_host: default_docs_host(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaPackageConfig {
    /// Top-level assignments re-exported instead of dropped
    #[serde(default = "default_keep_names")]
    pub keep_names: Vec<String>,

    /// Definitions whose name contains any of these are never re-exported
    #[serde(default = "default_excluded_markers")]
    pub excluded_name_markers: Vec<String>,

    /// Entry-file lines mentioning this are dropped (default: "__about__")
    #[serde(default = "default_version_marker")]
    pub version_marker: String,

    /// File names copied through instead of being reduced to stubs
    #[serde(default = "default_entry_files")]
    pub entry_files: Vec<String>,

    /// Indentation added to a definition line to find its body (default: 4)
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,

    /// Dotted name of the generated package (default: "lightning.app")
    #[serde(default = "default_new_pkg")]
    pub new_pkg: String,
}

impl Default for MetaPackageConfig {
    fn default() -> Self {
        Self {
            keep_names: default_keep_names(),
            excluded_name_markers: default_excluded_markers(),
            version_marker: default_version_marker(),
            entry_files: default_entry_files(),
            indent_width: default_indent_width(),
            new_pkg: default_new_pkg(),
        }
    }
}

impl MetaPackageConfig {
    pub fn is_kept(&self, name: &str) -> bool {
        self.keep_names.iter().any(|k| k == name)
    }

    pub fn is_entry_file(&self, file_name: &str) -> bool {
        self.entry_files.iter().any(|e| e == file_name)
    }

    pub fn is_excluded_name(&self, name: &str) -> bool {
        self.excluded_name_markers
            .iter()
            .any(|m| !m.is_empty() && name.contains(m.as_str()))
    }
}

fn default_requirements_file() -> String {
    "requirements.txt".to_string()
}

fn default_comment_char() -> String {
    "#".to_string()
}

fn default_readme_file() -> String {
    "README.md".to_string()
}

fn default_docs_host() -> String {
    "lightning.readthedocs.io".to_string()
}

fn default_keep_names() -> Vec<String> {
    [
        "_logger",
        "_root_logger",
        "_console",
        "formatter",
        "_PACKAGE_ROOT",
        "_PROJECT_ROOT",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_excluded_markers() -> Vec<String> {
    vec!["on_before_run".to_string()]
}

fn default_version_marker() -> String {
    "__about__".to_string()
}

fn default_entry_files() -> Vec<String> {
    vec!["__init__.py".to_string(), "__main__.py".to_string()]
}

fn default_indent_width() -> usize {
    4
}

fn default_new_pkg() -> String {
    "lightning.app".to_string()
}

impl Config {
    /// Load configuration from a specific path, or use default search paths
    pub fn load_with_path(path: Option<String>) -> Result<Self> {
        // An explicit path must load; a broken file on a search path is skipped with a warning
        if let Some(config_path) = path {
            debug!("Loading config from explicit path: {}", config_path);
            return Self::load_from_path(&config_path);
        }

        let mut candidates = vec![PathBuf::from("relprep.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("relprep").join("config.toml"));
        }

        for candidate in candidates {
            if !candidate.is_file() {
                continue;
            }
            match Self::load_from_path(&candidate) {
                Ok(config) => {
                    debug!("Loaded config from {:?}", candidate);
                    return Ok(config);
                }
                Err(e) => warn!("Ignoring invalid config {}: {:#}", candidate.display(), e),
            }
        }

        debug!("Using default config");
        Ok(Self::default())
    }

    fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        if self.requirements.comment_char.is_empty() {
            return Err(SetupError::InvalidConfig(
                "requirements.comment_char must not be empty".to_string(),
            ));
        }
        if self.meta_package.indent_width == 0 {
            return Err(SetupError::InvalidConfig(
                "meta_package.indent_width must be at least 1".to_string(),
            ));
        }
        if self.meta_package.new_pkg.trim().is_empty() {
            return Err(SetupError::InvalidConfig(
                "meta_package.new_pkg must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
